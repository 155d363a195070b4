//! Handlers for the `/users` resource: registration, login, token refresh,
//! anonymous provisioning, the caller's character and inventory removal.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use questlog_core::error::CoreError;
use questlog_core::ledger::Character;
use questlog_core::types::DbId;
use questlog_core::user::{validate_local_user_id, validate_registration, CreateUser, User};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{issue_session, refresh_token_digest};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /users/init`.
#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub local_user_id: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub token: String,
    pub refresh_token: String,
}

/// Returned by `POST /users/init`.
#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub user: User,
    pub character: Character,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid credentials".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/users/register
///
/// Create a registered user and their character. Returns 201 with tokens.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_registration(&input.username, &input.email)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let email = input.email.trim().to_string();
    if state.stores.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "User already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let (user, character) = state
        .stores
        .create_user_with_character(&CreateUser {
            username: input.username.trim().to_string(),
            email: Some(email),
            password_hash: Some(password_hash),
            local_user_id: None,
        })
        .await?;
    tracing::info!(user_id = user.id, character_id = character.id, "Registered user");

    let response = create_auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/users/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .stores
        .users
        .find_user_by_email(input.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let hash = user.password_hash.as_deref().ok_or_else(invalid_credentials)?;
    let valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(user_id = user.id, "Rejected login");
        return Err(invalid_credentials());
    }

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/users/refresh
///
/// Exchange a valid refresh token for a new token pair. The old refresh
/// token stops working.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = refresh_token_digest(&input.refresh_token);
    let user = state
        .stores
        .users
        .find_user_by_refresh_hash(&token_hash)
        .await?
        .filter(|u| u.refresh_token_expires_at.is_some_and(|exp| exp > Utc::now()))
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/users/init
///
/// Find or create the anonymous user for a device id, with its character.
pub async fn init(
    State(state): State<AppState>,
    Json(input): Json<InitRequest>,
) -> AppResult<Json<InitResponse>> {
    let local_user_id = input.local_user_id.trim();
    validate_local_user_id(local_user_id)?;

    let (user, character) = state.stores.provision_local_user(local_user_id).await?;
    Ok(Json(InitResponse { user, character }))
}

/// GET /api/users/me/character
pub async fn me_character(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Character>> {
    let character = find_character(&state, auth.user_id).await?;
    Ok(Json(character))
}

/// DELETE /api/users/inventory/{item_name}
///
/// Remove the first inventory item with this name.
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_name): Path<String>,
) -> AppResult<Json<Character>> {
    let mut character = find_character(&state, auth.user_id).await?;
    if character.remove_item_named(&item_name).is_none() {
        return Err(AppError::NotFound(format!(
            "Item '{item_name}' not found in inventory"
        )));
    }

    let character = state.stores.characters.save_character(&character).await?;
    tracing::info!(user_id = auth.user_id, item = %item_name, "Deleted inventory item");
    Ok(Json(character))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_character(state: &AppState, user_id: DbId) -> AppResult<Character> {
    state
        .stores
        .characters
        .find_character_by_user(user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: user_id,
        }))
}

/// Start a new session, replacing any refresh token the user held.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let session = issue_session(user.id, &state.config.jwt, Utc::now())
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state
        .stores
        .users
        .set_refresh_token(user.id, &session.refresh.hash, session.refresh.expires_at)
        .await?;

    Ok(AuthResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        token: session.access_token,
        refresh_token: session.refresh.plaintext,
    })
}
