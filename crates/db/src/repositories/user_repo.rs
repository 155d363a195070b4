//! Repository for the `users` table.

use questlog_core::types::{DbId, Timestamp};
use questlog_core::user::CreateUser;
use sqlx::PgPool;

use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, local_user_id, \
                       refresh_token_hash, refresh_token_expires_at, created_at, updated_at";

/// Provides queries for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, local_user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.local_user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an anonymous user by client-generated device id.
    pub async fn find_by_local_id(
        pool: &PgPool,
        local_user_id: &str,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE local_user_id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(local_user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the user holding a refresh token, by SHA-256 hash.
    pub async fn find_by_refresh_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE refresh_token_hash = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored refresh token. Returns `false` if the user does not exist.
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: DbId,
        hash: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users
             SET refresh_token_hash = $2, refresh_token_expires_at = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
