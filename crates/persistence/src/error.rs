//! Mapping of driver errors onto the domain store error.

use domain::StoreError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Converts a `sqlx` error into a [`StoreError`].
///
/// Constraint names are kept so logs can tell which key clashed; anything
/// else is reported as an unavailable store.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(ref db) => {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::Conflict(constraint_message(&constraint)),
                Some(FOREIGN_KEY_VIOLATION) => StoreError::MissingReference(constraint),
                _ => {
                    tracing::error!(error = %err, "Database error");
                    StoreError::Unavailable("database error".to_string())
                }
            }
        }
        sqlx::Error::ColumnDecode { ref index, .. } => {
            tracing::error!(error = %err, column = %index, "Failed to decode column");
            StoreError::Corrupt(index.clone())
        }
        other => {
            tracing::error!(error = %other, "Database unavailable");
            StoreError::Unavailable(other.to_string())
        }
    }
}

/// User-facing text for a unique constraint clash.
fn constraint_message(constraint: &str) -> String {
    match constraint {
        "idx_user_profiles_email" => "A user with this email already exists".to_string(),
        "user_profiles_auth_user_id_key" => "Profile already exists".to_string(),
        other => format!("Duplicate value for {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_unavailable() {
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_constraint_messages() {
        assert_eq!(
            constraint_message("idx_user_profiles_email"),
            "A user with this email already exists"
        );
        assert_eq!(
            constraint_message("some_key"),
            "Duplicate value for some_key"
        );
    }
}
