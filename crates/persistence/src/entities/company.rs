//! Company entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Company;
use sqlx::FromRow;

/// Database row mapping for the companies table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyEntity {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CompanyEntity> for Company {
    fn from(entity: CompanyEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}
