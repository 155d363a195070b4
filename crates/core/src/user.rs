//! User identities.
//!
//! A user is either registered (email + password hash) or anonymous, keyed by
//! a client-generated local device id. Both kinds own exactly one character.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum accepted username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub local_user_id: Option<String>,
    #[serde(skip)]
    pub refresh_token_hash: Option<String>,
    #[serde(skip)]
    pub refresh_token_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub local_user_id: Option<String>,
}

impl CreateUser {
    /// An anonymous user for a local device id.
    pub fn local(local_user_id: &str) -> Self {
        Self {
            username: local_username(local_user_id),
            email: None,
            password_hash: None,
            local_user_id: Some(local_user_id.to_string()),
        }
    }
}

/// Display name for an anonymous user: `User_<suffix>`, where the suffix is
/// everything after the first `_` of the device id (or the whole id).
pub fn local_username(local_user_id: &str) -> String {
    let suffix = local_user_id
        .split_once('_')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(local_user_id);
    format!("User_{suffix}")
}

/// Validate registration fields that do not involve the password.
pub fn validate_registration(username: &str, email: &str) -> Result<(), CoreError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CoreError::Validation("Username must not be empty".into()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::Validation("Email address is invalid".into())),
    }
}

/// Validate a client-supplied local device id.
pub fn validate_local_user_id(local_user_id: &str) -> Result<(), CoreError> {
    if local_user_id.trim().is_empty() {
        return Err(CoreError::Validation("Local user id must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn local_username_uses_suffix_after_first_underscore() {
        assert_eq!(local_username("local_abc123"), "User_abc123");
        assert_eq!(local_username("local_a_b"), "User_a_b");
        assert_eq!(local_username("device42"), "User_device42");
        assert_eq!(local_username("trailing_"), "User_trailing_");
    }

    #[test]
    fn registration_requires_username_and_email() {
        assert!(validate_registration("hero", "hero@example.com").is_ok());
        assert_matches!(
            validate_registration(" ", "hero@example.com"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_registration("hero", "not-an-email"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_registration("hero", "@example.com"),
            Err(CoreError::Validation(_))
        );
    }
}
