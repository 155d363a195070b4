//! Row model for the `users` table.

use questlog_core::types::{DbId, Timestamp};
use questlog_core::user::User;
use sqlx::FromRow;

/// Full user row. Contains credential hashes; convert with [`UserRow::into_domain`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub local_user_id: Option<String>,
    pub refresh_token_hash: Option<String>,
    pub refresh_token_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRow {
    pub fn into_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            local_user_id: self.local_user_id,
            refresh_token_hash: self.refresh_token_hash,
            refresh_token_expires_at: self.refresh_token_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
