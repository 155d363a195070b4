//! Route definitions for the `/users` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /register                -> register
/// POST   /login                   -> login
/// POST   /refresh                 -> refresh
/// POST   /init                    -> init
/// GET    /me/character            -> me_character (requires auth)
/// DELETE /inventory/{item_name}   -> delete_inventory_item (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/refresh", post(users::refresh))
        .route("/init", post(users::init))
        .route("/me/character", get(users::me_character))
        .route("/inventory/{item_name}", delete(users::delete_inventory_item))
}
