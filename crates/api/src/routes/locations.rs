//! Location endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use domain::models::{CreateLocationRequest, Location, UpdateLocationRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: Location,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// GET /api/v1/locations
pub async fn list_locations(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
) -> Result<Json<LocationsResponse>, ApiError> {
    let locations = state.locations.list_locations(&ctx.actor).await?;
    Ok(Json(LocationsResponse { locations }))
}

/// GET /api/v1/locations/:location_id
pub async fn get_location(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(location_id): Path<i64>,
) -> Result<Json<LocationResponse>, ApiError> {
    let location = state.locations.get_location(&ctx.actor, location_id).await?;
    Ok(Json(LocationResponse { location }))
}

/// POST /api/v1/locations
pub async fn create_location(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<LocationResponse>), ApiError> {
    let location = state.locations.create_location(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(LocationResponse { location })))
}

/// PATCH /api/v1/locations/:location_id
pub async fn update_location(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(location_id): Path<i64>,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<LocationResponse>, ApiError> {
    let location = state
        .locations
        .update_location(&ctx, location_id, request)
        .await?;
    Ok(Json(LocationResponse { location }))
}

/// Deletes a location. Refused while devices remain.
///
/// DELETE /api/v1/locations/:location_id
pub async fn delete_location(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(location_id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.locations.delete_location(&ctx, location_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
