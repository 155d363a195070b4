//! Route definitions for the `/quests` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::quests;
use crate::state::AppState;

/// Routes mounted at `/quests`.
///
/// ```text
/// PUT /{id}/complete     -> complete
/// PUT /{id}/uncomplete   -> uncomplete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/complete", put(quests::complete))
        .route("/{id}/uncomplete", put(quests::uncomplete))
}
