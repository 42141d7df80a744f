//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AuditLogEntry;
use domain::StoreError;
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database row mapping for the audit_logs table.
///
/// Action and entity type are stored as text so the taxonomy can grow
/// without a schema change; rows with unknown values fail conversion.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: i64,
    pub actor_profile_id: Option<i64>,
    pub action: String,
    pub taxonomy_version: i16,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub details: JsonValue,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub prev_hash: String,
    pub entry_hash: String,
}

impl TryFrom<AuditLogEntity> for AuditLogEntry {
    type Error = StoreError;

    fn try_from(entity: AuditLogEntity) -> Result<Self, Self::Error> {
        let action = entity
            .action
            .parse()
            .map_err(|e: String| StoreError::Corrupt(format!("audit entry {}: {}", entity.id, e)))?;
        let entity_type = entity
            .entity_type
            .parse()
            .map_err(|e: String| StoreError::Corrupt(format!("audit entry {}: {}", entity.id, e)))?;

        Ok(Self {
            id: entity.id,
            actor_profile_id: entity.actor_profile_id,
            action,
            taxonomy_version: entity.taxonomy_version,
            entity_type,
            entity_id: entity.entity_id,
            details: entity.details,
            ip_address: entity.ip_address,
            created_at: entity.created_at,
            prev_hash: entity.prev_hash,
            entry_hash: entity.entry_hash,
        })
    }
}
