//! Alert endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use domain::models::{Alert, AlertView, SnoozeAlertRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Default, Deserialize)]
pub struct ListAlertsQuery {
    /// `active` (default) hides resolved and still-snoozed alerts; `all`
    /// returns every alert in scope.
    #[serde(default)]
    pub view: AlertView,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub alert: Alert,
}

/// GET /api/v1/alerts?view=active|all
pub async fn list_alerts(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let alerts = state
        .alerts
        .list(&ctx.actor, query.view, Utc::now())
        .await?;
    Ok(Json(AlertsResponse { alerts }))
}

/// POST /api/v1/alerts/snooze
pub async fn snooze_alert(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Json(request): Json<SnoozeAlertRequest>,
) -> Result<Json<AlertResponse>, ApiError> {
    let alert_id = request
        .alert_id
        .ok_or_else(|| ApiError::Validation("alertId is required".to_string()))?;
    let duration = request
        .duration_minutes
        .map(|minutes| {
            Duration::try_minutes(minutes).ok_or_else(|| {
                ApiError::Validation("durationMinutes is out of range".to_string())
            })
        })
        .transpose()?;

    let alert = state
        .alerts
        .snooze(&ctx, alert_id, duration, Utc::now())
        .await?;
    Ok(Json(AlertResponse { alert }))
}

/// POST /api/v1/alerts/:alert_id/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(alert_id): Path<i64>,
) -> Result<Json<AlertResponse>, ApiError> {
    let alert = state.alerts.resolve(&ctx, alert_id, Utc::now()).await?;
    Ok(Json(AlertResponse { alert }))
}
