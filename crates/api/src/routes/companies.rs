use axum::{extract::State, Json};
use serde::Serialize;

use domain::models::Company;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

/// GET /api/v1/companies
pub async fn list_companies(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
) -> Result<Json<CompaniesResponse>, ApiError> {
    let companies = state.locations.list_companies(&ctx.actor).await?;
    Ok(Json(CompaniesResponse { companies }))
}
