//! Audit log endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domain::models::{
    AuditAction, AuditEntityType, AuditLogEntry, AuditLogFilter, ChainVerification,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

/// Query parameters for listing audit logs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub action: Option<AuditAction>,
    pub entity_type: Option<AuditEntityType>,
    pub entity_id: Option<i64>,
    pub actor_profile_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditLogQuery {
    fn filter(&self) -> AuditLogFilter {
        AuditLogFilter {
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            actor_profile_id: self.actor_profile_id,
            from: self.from,
            to: self.to,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditLogsResponse {
    pub logs: Vec<AuditLogEntry>,
}

/// Newest-first audit entries visible to the caller.
///
/// GET /api/v1/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<AuditLogsResponse>, ApiError> {
    let logs = state
        .audit
        .query(&ctx.actor, &query.filter(), query.limit, query.offset)
        .await?;
    Ok(Json(AuditLogsResponse { logs }))
}

/// Walks the hash chain. Admin only.
///
/// GET /api/v1/audit-logs/verify
pub async fn verify_chain(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
) -> Result<Json<ChainVerification>, ApiError> {
    let report = state.audit.verify_chain(&ctx.actor).await?;
    Ok(Json(report))
}
