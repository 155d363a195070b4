//! Route definitions for the `/images` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// POST /generate     -> generate (requires auth)
/// GET  /{filename}   -> serve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(images::generate))
        .route("/{filename}", get(images::serve))
}
