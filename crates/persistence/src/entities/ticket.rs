//! Ticket entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Ticket, TicketStatus};
use sqlx::FromRow;

db_enum!(TicketStatusDb, "ticket_status", TicketStatus { Open, InProgress, Completed });

/// Database row mapping for the tickets table, joined with the location's
/// company.
#[derive(Debug, Clone, FromRow)]
pub struct TicketEntity {
    pub id: i64,
    pub location_id: i64,
    pub company_id: i64,
    pub device_id: Option<i64>,
    pub created_by: i64,
    pub problem: String,
    pub visit_date: NaiveDate,
    pub status: TicketStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TicketEntity> for Ticket {
    fn from(entity: TicketEntity) -> Self {
        Self {
            id: entity.id,
            location_id: entity.location_id,
            company_id: entity.company_id,
            device_id: entity.device_id,
            created_by: entity.created_by,
            problem: entity.problem,
            visit_date: entity.visit_date,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            completed_at: entity.completed_at,
        }
    }
}
