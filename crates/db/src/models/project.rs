//! Row model for the `projects` table.

use questlog_core::quest::{Project, Quest};
use questlog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::status::{project_status_from_id, StatusId};

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRow {
    /// Attach the project's quests, which must already be in plan order.
    pub fn into_domain(self, quests: Vec<Quest>) -> Project {
        Project {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            status: project_status_from_id(self.status_id),
            quests,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
