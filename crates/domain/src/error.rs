//! Domain error taxonomy.

use serde::Serialize;
use thiserror::Error;

/// Why an authenticated actor was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The role lacks the capability altogether.
    RoleInsufficient,
    /// The role has the capability but the target lies outside the actor's scope.
    ScopeMismatch,
    /// The account is pending approval or suspended.
    AccountInactive,
}

impl ForbiddenReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ForbiddenReason::RoleInsufficient => "forbidden.role_insufficient",
            ForbiddenReason::ScopeMismatch => "forbidden.scope_mismatch",
            ForbiddenReason::AccountInactive => "forbidden.account_inactive",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ForbiddenReason::RoleInsufficient => "Your role does not permit this operation",
            ForbiddenReason::ScopeMismatch => "The target is outside your organization scope",
            ForbiddenReason::AccountInactive => "Your account is not active",
        }
    }
}

impl std::fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForbiddenReason::RoleInsufficient => write!(f, "role_insufficient"),
            ForbiddenReason::ScopeMismatch => write!(f, "scope_mismatch"),
            ForbiddenReason::AccountInactive => write!(f, "account_inactive"),
        }
    }
}

/// Errors raised by domain services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {}", .0.message())]
    Forbidden(ForbiddenReason),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// The forbidden reason, if this is a denial.
    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            DomainError::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Errors raised by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Referenced record missing: {0}")]
    MissingReference(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => DomainError::Conflict(what),
            StoreError::MissingReference(what) => DomainError::NotFound(what),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match e.message {
                    Some(ref m) => format!("{}: {}", field, m),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        messages.sort();
        DomainError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_codes_are_distinct() {
        let codes = [
            ForbiddenReason::RoleInsufficient.code(),
            ForbiddenReason::ScopeMismatch.code(),
            ForbiddenReason::AccountInactive.code(),
        ];
        assert_eq!(codes[0], "forbidden.role_insufficient");
        assert_eq!(codes[1], "forbidden.scope_mismatch");
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: DomainError = StoreError::Conflict("email".into()).into();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn test_store_unavailable_maps_to_internal() {
        let err: DomainError = StoreError::Unavailable("pool timed out".into()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn test_forbidden_display() {
        let err = DomainError::Forbidden(ForbiddenReason::ScopeMismatch);
        assert_eq!(
            err.to_string(),
            "Forbidden: The target is outside your organization scope"
        );
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::ScopeMismatch));
    }
}
