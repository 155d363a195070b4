//! Repository for the `quests` table.

use questlog_core::quest::Quest;
use questlog_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::quest::{OwnedQuestRow, QuestRow};
use crate::models::status::quest_status_id;

pub(crate) const COLUMNS: &str = "id, project_id, position, title, description, task, \
                                  status_id, xp_reward, generated_loot, created_at, updated_at";

const QUALIFIED_COLUMNS: &str = "q.id, q.project_id, q.position, q.title, q.description, \
                                 q.task, q.status_id, q.xp_reward, q.generated_loot, \
                                 q.created_at, q.updated_at";

/// Provides queries for quests.
pub struct QuestRepo;

impl QuestRepo {
    /// Find a quest whose project belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        quest_id: DbId,
        user_id: DbId,
    ) -> Result<Option<OwnedQuestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS}, p.title AS project_title
             FROM quests q
             JOIN projects p ON p.id = q.project_id
             WHERE q.id = $1 AND p.user_id = $2"
        );
        sqlx::query_as::<_, OwnedQuestRow>(&query)
            .bind(quest_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All quests of the given projects, grouped by project in plan order.
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<QuestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quests
             WHERE project_id = ANY($1)
             ORDER BY project_id, position"
        );
        sqlx::query_as::<_, QuestRow>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Persist status and generated loot. Returns `None` if the row is gone.
    pub async fn save(pool: &PgPool, quest: &Quest) -> Result<Option<QuestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE quests SET
                 status_id = $2,
                 generated_loot = $3,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestRow>(&query)
            .bind(quest.id)
            .bind(quest_status_id(quest.status))
            .bind(quest.generated_loot.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }
}
