//! Repository for the `projects` table.

use questlog_core::quest::CreateProject;
use questlog_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::ProjectRow;
use crate::models::quest::QuestRow;
use crate::models::status::{project_status_id, quest_status_id};
use crate::repositories::quest_repo;

const COLUMNS: &str = "id, user_id, title, status_id, created_at, updated_at";

/// Provides queries for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project and its quests in one transaction.
    pub async fn create_with_quests(
        pool: &PgPool,
        input: &CreateProject,
    ) -> Result<(ProjectRow, Vec<QuestRow>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (user_id, title, status_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(project_status_id(questlog_core::quest::ProjectStatus::Active))
            .fetch_one(&mut *tx)
            .await?;

        let quest_query = format!(
            "INSERT INTO quests (project_id, position, title, description, task, status_id, xp_reward)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            quest_repo::COLUMNS
        );
        let mut quests = Vec::with_capacity(input.quests.len());
        for (position, draft) in input.quests.iter().enumerate() {
            let quest = sqlx::query_as::<_, QuestRow>(&quest_query)
                .bind(project.id)
                .bind(position as i32)
                .bind(&draft.title)
                .bind(&draft.description)
                .bind(&draft.task)
                .bind(quest_status_id(questlog_core::quest::QuestStatus::Pending))
                .bind(input.xp_reward)
                .fetch_one(&mut *tx)
                .await?;
            quests.push(quest);
        }

        tx.commit().await?;
        Ok((project, quests))
    }

    /// All projects of a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
