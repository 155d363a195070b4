//! Translation of sqlx errors into domain errors.

use questlog_core::error::CoreError;

/// Classify a sqlx error.
///
/// - Unique violations (`23505`) on a constraint named `uq_*` become
///   [`CoreError::Conflict`].
/// - Everything else becomes [`CoreError::Storage`].
pub fn classify(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(conflict_message(constraint));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_users_email" => "Email is already registered".to_string(),
        "uq_users_local_user_id" => "Local user id already exists".to_string(),
        "uq_characters_user_id" => "User already has a character".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn row_not_found_is_storage() {
        assert_matches!(classify(sqlx::Error::RowNotFound), CoreError::Storage(_));
    }

    #[test]
    fn known_constraints_have_friendly_messages() {
        assert_eq!(conflict_message("uq_users_email"), "Email is already registered");
        assert!(conflict_message("uq_other").contains("uq_other"));
    }
}
