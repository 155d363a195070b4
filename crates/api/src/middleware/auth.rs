//! Principal resolution for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use questlog_core::error::CoreError;
use questlog_core::types::DbId;
use questlog_core::user::validate_local_user_id;

use crate::auth::jwt::authenticate;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying a client-generated device id for anonymous play.
pub const LOCAL_USER_HEADER: &str = "x-local-user-id";

/// Authenticated user.
///
/// A `Bearer` token in the `Authorization` header wins. Without one, the
/// `x-local-user-id` header identifies an anonymous user, who is created
/// (with a character) on first sight.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.headers.get(AUTHORIZATION) {
            let token = auth_header
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| {
                    AppError::Core(CoreError::Unauthorized(
                        "Invalid Authorization format. Expected: Bearer <token>".into(),
                    ))
                })?;

            let user_id = authenticate(token, &state.config.jwt).map_err(|_| {
                AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
            })?;

            return Ok(AuthUser { user_id });
        }

        let local_user_id = parts
            .headers
            .get(LOCAL_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Not authorized: missing bearer token or local user id".into(),
                ))
            })?;
        validate_local_user_id(local_user_id)
            .map_err(|_| AppError::Core(CoreError::Unauthorized("Local user id is empty".into())))?;

        let (user, _) = state.stores.provision_local_user(local_user_id).await?;
        Ok(AuthUser { user_id: user.id })
    }
}
