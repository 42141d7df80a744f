//! Location entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Location;
use sqlx::FromRow;

/// Database row mapping for the locations table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationEntity {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationEntity> for Location {
    fn from(entity: LocationEntity) -> Self {
        Self {
            id: entity.id,
            company_id: entity.company_id,
            name: entity.name,
            postal_code: entity.postal_code,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
