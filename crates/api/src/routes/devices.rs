//! Device endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use domain::models::{CreateDeviceRequest, Device, UpdateDeviceRequest};
use domain::services::ReadingPage;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;
use crate::routes::locations::SuccessResponse;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicesQuery {
    pub location_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadingsQuery {
    /// Opaque cursor from a previous page's `nextCursor`.
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub device: Device,
}

/// GET /api/v1/devices?locationId=
pub async fn list_devices(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<DevicesResponse>, ApiError> {
    let devices = state
        .locations
        .list_devices(&ctx.actor, query.location_id)
        .await?;
    Ok(Json(DevicesResponse { devices }))
}

/// GET /api/v1/devices/:device_id
pub async fn get_device(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(device_id): Path<i64>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state.locations.get_device(&ctx.actor, device_id).await?;
    Ok(Json(DeviceResponse { device }))
}

/// POST /api/v1/devices
pub async fn create_device(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Json(request): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    let device = state.locations.create_device(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(DeviceResponse { device })))
}

/// PATCH /api/v1/devices/:device_id
pub async fn update_device(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(device_id): Path<i64>,
    Json(request): Json<UpdateDeviceRequest>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state
        .locations
        .update_device(&ctx, device_id, request)
        .await?;
    Ok(Json(DeviceResponse { device }))
}

/// DELETE /api/v1/devices/:device_id
pub async fn delete_device(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(device_id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.locations.delete_device(&ctx, device_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Newest-first reading history.
///
/// GET /api/v1/devices/:device_id/readings?cursor=&limit=
pub async fn list_readings(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(device_id): Path<i64>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<ReadingPage>, ApiError> {
    let page = state
        .alerts
        .list_readings(&ctx.actor, device_id, query.cursor.as_deref(), query.limit)
        .await?;
    Ok(Json(page))
}
