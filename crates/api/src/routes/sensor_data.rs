//! Device-submitted readings.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use domain::models::SensorDataRequest;
use domain::services::IngestOutcome;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::IngestKey;

/// Stores a reading and evaluates it against the device's thresholds.
///
/// POST /api/v1/sensor-data
pub async fn submit(
    State(state): State<AppState>,
    _key: IngestKey,
    Json(request): Json<SensorDataRequest>,
) -> Result<(StatusCode, Json<IngestOutcome>), ApiError> {
    let now = Utc::now();
    let outcome = state
        .alerts
        .ingest(request.into_new_reading(now), now)
        .await?;

    if !outcome.evaluation.created.is_empty() {
        tracing::info!(
            device_id = outcome.reading.device_id,
            created = outcome.evaluation.created.len(),
            "Reading raised alerts"
        );
    }
    Ok((StatusCode::CREATED, Json(outcome)))
}
