//! Row models for the `quests` table.

use questlog_core::loot::LootItem;
use questlog_core::quest::{OwnedQuest, Quest};
use questlog_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

use super::status::{quest_status_from_id, StatusId};

#[derive(Debug, Clone, FromRow)]
pub struct QuestRow {
    pub id: DbId,
    pub project_id: DbId,
    pub position: i32,
    pub title: String,
    pub description: String,
    pub task: String,
    pub status_id: StatusId,
    pub xp_reward: i32,
    pub generated_loot: Option<Json<LootItem>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QuestRow {
    pub fn into_domain(self) -> Quest {
        Quest {
            id: self.id,
            project_id: self.project_id,
            position: self.position,
            title: self.title,
            description: self.description,
            task: self.task,
            status: quest_status_from_id(self.status_id),
            xp_reward: self.xp_reward,
            generated_loot: self.generated_loot.map(|loot| loot.0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A quest joined with its project's title.
#[derive(Debug, Clone, FromRow)]
pub struct OwnedQuestRow {
    #[sqlx(flatten)]
    pub quest: QuestRow,
    pub project_title: String,
}

impl OwnedQuestRow {
    pub fn into_domain(self) -> OwnedQuest {
        OwnedQuest {
            quest: self.quest.into_domain(),
            project_title: self.project_title,
        }
    }
}
