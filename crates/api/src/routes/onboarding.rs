//! First sign-in onboarding.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use domain::models::{OnboardingRequest, UserProfile};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ClientIp, Session};

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub success: bool,
    pub profile: UserProfile,
}

/// Creates the caller's profile. Managers get a new company and location,
/// employees join an existing location; both start pending approval.
///
/// POST /api/v1/onboarding
pub async fn onboard(
    State(state): State<AppState>,
    Session(session): Session,
    ClientIp(ip): ClientIp,
    Json(request): Json<OnboardingRequest>,
) -> Result<(StatusCode, Json<OnboardingResponse>), ApiError> {
    let profile = state.users.onboard(&session, request, Some(ip)).await?;

    Ok((
        StatusCode::CREATED,
        Json(OnboardingResponse {
            success: true,
            profile,
        }),
    ))
}
