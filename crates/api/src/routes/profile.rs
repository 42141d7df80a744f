use axum::{extract::State, Json};
use serde::Serialize;

use domain::models::UserProfile;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
}

/// GET /api/v1/profile
///
/// Works for pending and suspended accounts too, so the dashboard can show
/// the account state.
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.users.profile(&ctx.actor).await?;
    Ok(Json(ProfileResponse { profile }))
}
