//! Session token and actor extractors.
//!
//! [`Session`] only verifies the bearer token. [`CurrentActor`] additionally
//! resolves the profile bound to it and is what nearly every handler takes.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use domain::models::RequestContext;
use domain::services::SessionIdentity;
use shared::jwt::extract_auth_user_id;

use super::client_ip::ClientIp;
use crate::app::AppState;
use crate::error::ApiError;

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// A verified session that may not have a profile yet.
#[derive(Debug, Clone)]
pub struct Session(pub SessionIdentity);

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let claims = state.jwt.verify(bearer_token(parts)?)?;
        let session = Session(SessionIdentity {
            auth_user_id: extract_auth_user_id(&claims)?,
            email: claims.email,
        });

        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// The resolved caller plus the request metadata audit entries record.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Session(identity) = Session::from_request_parts(parts, state).await?;

        let profile = state
            .directory
            .resolve_profile(identity.auth_user_id, identity.email.as_deref())
            .await?
            .ok_or_else(|| ApiError::Unauthorized("No profile for session".to_string()))?;

        let ClientIp(ip) = match ClientIp::from_request_parts(parts, state).await {
            Ok(ip) => ip,
            Err(never) => match never {},
        };

        tracing::Span::current().record("profile_id", profile.id);
        Ok(CurrentActor(RequestContext::new(profile.to_actor(), Some(ip))))
    }
}
