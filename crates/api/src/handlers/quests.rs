//! Handlers for quest completion and reversal.

use axum::extract::{Path, State};
use axum::Json;
use questlog_core::ledger::Character;
use questlog_core::loot::LootItem;
use questlog_core::types::DbId;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub message: &'static str,
    pub updated_character: Character,
    pub new_loot: LootItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UncompleteResponse {
    pub message: &'static str,
    pub updated_character: Character,
}

/// PUT /api/quests/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quest_id): Path<DbId>,
) -> AppResult<Json<CompleteResponse>> {
    let completion = state.lifecycle.complete(quest_id, auth.user_id).await?;
    Ok(Json(CompleteResponse {
        message: "Quest completed!",
        updated_character: completion.character,
        new_loot: completion.loot,
    }))
}

/// PUT /api/quests/{id}/uncomplete
pub async fn uncomplete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quest_id): Path<DbId>,
) -> AppResult<Json<UncompleteResponse>> {
    let reversal = state.lifecycle.uncomplete(quest_id, auth.user_id).await?;
    Ok(Json(UncompleteResponse {
        message: "Quest reverted!",
        updated_character: reversal.character,
    }))
}
