//! Alert repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{Alert, AlertType, AlertView, NewAlert};
use domain::ports::AlertStore;
use domain::services::ScopeFilter;
use domain::StoreError;
use sqlx::PgPool;

use super::filter::FilterBuilder;
use crate::entities::{AlertEntity, AlertSeverityDb, AlertTypeDb};
use crate::error::store_error;
use crate::metrics::QueryTimer;

/// Alert columns with the company joined from the location. Expects the
/// alert relation aliased `a` and locations aliased `l`.
const ALERT_COLUMNS: &str = r#"
    a.id, a.device_id, a.location_id, l.company_id, a.alert_type, a.message, a.severity,
    a.status, a.snoozed_until, a.condition_started_at, a.created_at, a.resolved_at
"#;

/// Renders the display predicate over alias `a` with `now` at `param`.
fn display_active_sql(param: usize) -> String {
    format!(
        "a.status <> 'resolved' AND (a.snoozed_until IS NULL OR a.snoozed_until < ${})",
        param
    )
}

/// Repository for alert database operations.
#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Alert>, sqlx::Error> {
        let timer = QueryTimer::new("find_alert");
        let entity = sqlx::query_as::<_, AlertEntity>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts a JOIN locations l ON l.id = a.location_id WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn find_open(
        &self,
        device_id: i64,
        alert_type: AlertType,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let timer = QueryTimer::new("find_unresolved_alert");
        let entity = sqlx::query_as::<_, AlertEntity>(&format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM alerts a JOIN locations l ON l.id = a.location_id
            WHERE a.device_id = $1 AND a.alert_type = $2 AND a.status <> 'resolved'
            "#
        ))
        .bind(device_id)
        .bind(AlertTypeDb::from(alert_type))
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    /// Inserts unless an unresolved alert for the same device and type
    /// exists. The partial unique index makes this race-free.
    pub async fn insert(&self, alert: NewAlert) -> Result<Option<Alert>, sqlx::Error> {
        let timer = QueryTimer::new("insert_alert");
        let entity = sqlx::query_as::<_, AlertEntity>(&format!(
            r#"
            WITH a AS (
                INSERT INTO alerts (
                    device_id, location_id, alert_type, message, severity,
                    condition_started_at, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (device_id, alert_type) WHERE status <> 'resolved' DO NOTHING
                RETURNING *
            )
            SELECT {ALERT_COLUMNS} FROM a JOIN locations l ON l.id = a.location_id
            "#
        ))
        .bind(alert.device_id)
        .bind(alert.location_id)
        .bind(AlertTypeDb::from(alert.alert_type))
        .bind(&alert.message)
        .bind(AlertSeverityDb::from(alert.severity))
        .bind(alert.condition_started_at)
        .bind(alert.created_at)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn list(
        &self,
        scope: &ScopeFilter,
        view: AlertView,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let mut filter = FilterBuilder::new();
        let scope_id = filter.scope(scope, "l.company_id = {}", "a.location_id = {}");
        let active = view == AlertView::Active;
        if active {
            filter.raw(&display_active_sql(filter.param_count() + 1));
        }
        let sql = format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM alerts a JOIN locations l ON l.id = a.location_id
            WHERE {}
            ORDER BY a.created_at DESC, a.id DESC
            "#,
            filter.where_clause()
        );

        let timer = QueryTimer::new("list_alerts");
        let mut query = sqlx::query_as::<_, AlertEntity>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }
        if active {
            query = query.bind(now);
        }
        let entities = timer.finish(query.fetch_all(&self.pool).await)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Conditional transition to snoozed; resolved alerts are left alone.
    pub async fn snooze(
        &self,
        id: i64,
        until: DateTime<Utc>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let timer = QueryTimer::new("snooze_alert");
        let entity = sqlx::query_as::<_, AlertEntity>(&format!(
            r#"
            WITH a AS (
                UPDATE alerts SET status = 'snoozed', snoozed_until = $2
                WHERE id = $1 AND status <> 'resolved'
                RETURNING *
            )
            SELECT {ALERT_COLUMNS} FROM a JOIN locations l ON l.id = a.location_id
            "#
        ))
        .bind(id)
        .bind(until)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }

    pub async fn resolve(&self, id: i64, at: DateTime<Utc>) -> Result<Option<Alert>, sqlx::Error> {
        let timer = QueryTimer::new("resolve_alert");
        let entity = sqlx::query_as::<_, AlertEntity>(&format!(
            r#"
            WITH a AS (
                UPDATE alerts SET status = 'resolved', resolved_at = $2
                WHERE id = $1 AND status <> 'resolved'
                RETURNING *
            )
            SELECT {ALERT_COLUMNS} FROM a JOIN locations l ON l.id = a.location_id
            "#
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await;
        Ok(timer.finish(entity)?.map(Into::into))
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn find_alert(&self, id: i64) -> Result<Option<Alert>, StoreError> {
        self.find_by_id(id).await.map_err(store_error)
    }

    async fn find_unresolved(
        &self,
        device_id: i64,
        alert_type: AlertType,
    ) -> Result<Option<Alert>, StoreError> {
        self.find_open(device_id, alert_type)
            .await
            .map_err(store_error)
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Option<Alert>, StoreError> {
        self.insert(alert).await.map_err(store_error)
    }

    async fn list_alerts(
        &self,
        scope: &ScopeFilter,
        view: AlertView,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, StoreError> {
        self.list(scope, view, now).await.map_err(store_error)
    }

    async fn snooze_alert(
        &self,
        id: i64,
        until: DateTime<Utc>,
    ) -> Result<Option<Alert>, StoreError> {
        self.snooze(id, until).await.map_err(store_error)
    }

    async fn resolve_alert(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Alert>, StoreError> {
        self.resolve(id, at).await.map_err(store_error)
    }
}
