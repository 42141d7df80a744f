//! Device ingest key extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::crypto::secrets_match;

use crate::app::AppState;
use crate::error::ApiError;

pub const INGEST_KEY_HEADER: &str = "X-Ingest-Key";

/// Proof that the request carried the configured ingest key.
#[derive(Debug, Clone, Copy)]
pub struct IngestKey;

impl IngestKey {
    /// Compares the presented key with the configured one. An empty
    /// configured key rejects everything.
    pub fn validate(presented: Option<&str>, configured: &str) -> Result<Self, ApiError> {
        match presented {
            Some(key) if secrets_match(key, configured) => Ok(IngestKey),
            _ => Err(ApiError::Unauthorized(
                "Invalid or missing ingest key".to_string(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for IngestKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(INGEST_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        Self::validate(presented, &state.config.ingest.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key_accepted() {
        assert!(IngestKey::validate(Some("dev-fleet-key"), "dev-fleet-key").is_ok());
    }

    #[test]
    fn test_wrong_or_missing_key_rejected() {
        assert!(IngestKey::validate(Some("guess"), "dev-fleet-key").is_err());
        assert!(IngestKey::validate(None, "dev-fleet-key").is_err());
    }

    #[test]
    fn test_unconfigured_key_rejects_everything() {
        assert!(IngestKey::validate(Some(""), "").is_err());
    }
}
