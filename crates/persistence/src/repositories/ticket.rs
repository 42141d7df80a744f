//! Ticket repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{NewTicket, Ticket, TicketChanges};
use domain::ports::TicketStore;
use domain::services::ScopeFilter;
use domain::StoreError;
use sqlx::PgPool;

use super::filter::FilterBuilder;
use crate::entities::{TicketEntity, TicketStatusDb};
use crate::error::store_error;
use crate::metrics::QueryTimer;

const TICKET_COLUMNS: &str = r#"
    t.id, t.location_id, l.company_id, t.device_id, t.created_by, t.problem, t.visit_date,
    t.status, t.created_at, t.updated_at, t.completed_at
"#;

/// Repository for ticket database operations.
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, ticket: NewTicket) -> Result<Ticket, sqlx::Error> {
        let timer = QueryTimer::new("insert_ticket");
        let entity = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            WITH t AS (
                INSERT INTO tickets (location_id, device_id, created_by, problem, visit_date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {TICKET_COLUMNS} FROM t JOIN locations l ON l.id = t.location_id
            "#
        ))
        .bind(ticket.location_id)
        .bind(ticket.device_id)
        .bind(ticket.created_by)
        .bind(&ticket.problem)
        .bind(ticket.visit_date)
        .fetch_one(&self.pool)
        .await;
        Ok(timer.finish(entity)?.into())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, sqlx::Error> {
        let timer = QueryTimer::new("find_ticket");
        let entity = sqlx::query_as::<_, TicketEntity>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets t JOIN locations l ON l.id = t.location_id WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn list(&self, scope: &ScopeFilter) -> Result<Vec<Ticket>, sqlx::Error> {
        let mut filter = FilterBuilder::new();
        let scope_id = filter.scope(scope, "l.company_id = {}", "t.location_id = {}");
        let sql = format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM tickets t JOIN locations l ON l.id = t.location_id
            WHERE {}
            ORDER BY t.created_at DESC, t.id DESC
            "#,
            filter.where_clause()
        );

        let timer = QueryTimer::new("list_tickets");
        let mut query = sqlx::query_as::<_, TicketEntity>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }
        let entities = timer.finish(query.fetch_all(&self.pool).await)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Applies a partial update; `completed_at` is stamped when the ticket
    /// first reaches completed.
    pub async fn update(
        &self,
        id: i64,
        changes: &TicketChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let timer = QueryTimer::new("update_ticket");
        let entity = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            WITH t AS (
                UPDATE tickets SET
                    completed_at = CASE
                        WHEN $2 = 'completed'::ticket_status AND status <> 'completed' THEN $5
                        ELSE completed_at
                    END,
                    status = COALESCE($2, status),
                    problem = COALESCE($3, problem),
                    visit_date = COALESCE($4, visit_date),
                    updated_at = $5
                WHERE id = $1
                RETURNING *
            )
            SELECT {TICKET_COLUMNS} FROM t JOIN locations l ON l.id = t.location_id
            "#
        ))
        .bind(id)
        .bind(changes.status.map(TicketStatusDb::from))
        .bind(&changes.problem)
        .bind(changes.visit_date)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        self.insert(ticket).await.map_err(store_error)
    }

    async fn find_ticket(&self, id: i64) -> Result<Option<Ticket>, StoreError> {
        self.find_by_id(id).await.map_err(store_error)
    }

    async fn list_tickets(&self, scope: &ScopeFilter) -> Result<Vec<Ticket>, StoreError> {
        self.list(scope).await.map_err(store_error)
    }

    async fn update_ticket(
        &self,
        id: i64,
        changes: &TicketChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>, StoreError> {
        self.update(id, changes, now).await.map_err(store_error)
    }
}
