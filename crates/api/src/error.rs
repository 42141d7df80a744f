use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, ForbiddenReason};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Detail is logged only; the caller always sees "Access denied".
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(detail) => {
                tracing::debug!(detail = %detail, "Request not authenticated");
                (
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "Access denied".to_string(),
                )
            }
            ApiError::Forbidden(reason) => {
                (StatusCode::FORBIDDEN, reason.code(), reason.message().to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthenticated => ApiError::Unauthorized("No resolvable actor".into()),
            DomainError::Forbidden(reason) => {
                metrics::counter!("authorization_denials_total", "reason" => reason.to_string())
                    .increment(1);
                ApiError::Forbidden(reason)
            }
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation(message)
    }
}

impl From<shared::jwt::JwtError> for ApiError {
    fn from(err: shared::jwt::JwtError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_hides_detail() {
        let response = ApiError::Unauthorized("Token has expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Access denied");
    }

    #[tokio::test]
    async fn test_forbidden_reasons_have_distinct_codes() {
        for (reason, code) in [
            (ForbiddenReason::RoleInsufficient, "forbidden.role_insufficient"),
            (ForbiddenReason::ScopeMismatch, "forbidden.scope_mismatch"),
            (ForbiddenReason::AccountInactive, "forbidden.account_inactive"),
        ] {
            let response = ApiError::Forbidden(reason).into_response();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(body_json(response).await["error"], code);
        }
    }

    #[tokio::test]
    async fn test_internal_uses_fixed_message() {
        let response =
            ApiError::Internal("connection refused to 10.0.0.3:5432".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "An internal error occurred");
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases: Vec<(DomainError, StatusCode)> = vec![
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                DomainError::Forbidden(ForbiddenReason::ScopeMismatch),
                StatusCode::FORBIDDEN,
            ),
            (DomainError::not_found("Alert not found"), StatusCode::NOT_FOUND),
            (DomainError::validation("userId is required"), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("email".into()), StatusCode::CONFLICT),
            (
                DomainError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.into_response().status(), status);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::NotFound("test".to_string())),
            "Not found: test"
        );
        assert_eq!(
            format!("{}", ApiError::Forbidden(ForbiddenReason::ScopeMismatch)),
            "Forbidden: scope_mismatch"
        );
    }

    #[test]
    fn test_api_error_service_unavailable() {
        let error = ApiError::ServiceUnavailable("database".to_string());
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
