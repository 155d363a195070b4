pub mod health;
pub mod images;
pub mod projects;
pub mod quests;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/register                        register (public)
/// /users/login                           login (public)
/// /users/refresh                         refresh (public)
/// /users/init                            find-or-create anonymous user (public)
/// /users/me/character                    caller's character
/// /users/inventory/{item_name}           remove one item (DELETE)
///
/// /projects                              list
/// /projects/generate                     decompose a goal (POST)
///
/// /quests/{id}/complete                  complete (PUT)
/// /quests/{id}/uncomplete                revert (PUT)
///
/// /images/generate                       resolve or generate artwork (POST)
/// /images/{filename}                     stored artwork (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .nest("/quests", quests::router())
        .nest("/images", images::router())
}
