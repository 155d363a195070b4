//! Projects and the quests they decompose into.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, GenerationError};
use crate::loot::LootItem;
use crate::types::{DbId, Timestamp};

/// XP granted by quests created from a goal.
pub const GENERATED_QUEST_XP_REWARD: i32 = 25;

/// Maximum accepted goal length in characters.
pub const MAX_GOAL_LENGTH: usize = 500;

/// Quest lifecycle state.
///
/// `Active` is reserved: nothing transitions into or out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    Pending,
    Active,
    Completed,
}

/// Project lifecycle state. Only `Active` is ever assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Active,
    Completed,
}

/// A single step of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    pub id: DbId,
    pub project_id: DbId,
    /// Order within the project, starting at 0.
    pub position: i32,
    pub title: String,
    pub description: String,
    pub task: String,
    pub status: QuestStatus,
    pub xp_reward: i32,
    /// Exact copy of the item granted on completion, kept for rollback.
    pub generated_loot: Option<LootItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A quest together with the title of the project that owns it.
#[derive(Debug, Clone)]
pub struct OwnedQuest {
    pub quest: Quest,
    pub project_title: String,
}

/// A quest step as proposed by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDraft {
    pub title: String,
    pub description: String,
    pub task: String,
}

/// A goal decomposition owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub status: ProjectStatus,
    /// Quests in plan order.
    pub quests: Vec<Quest>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project and its quests in one step.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub user_id: DbId,
    pub title: String,
    pub quests: Vec<QuestDraft>,
    pub xp_reward: i32,
}

/// Decomposes a goal into an ordered list of quest steps.
#[async_trait]
pub trait QuestPlanner: Send + Sync {
    async fn plan_quests(&self, goal: &str) -> Result<Vec<QuestDraft>, GenerationError>;
}

/// Validate a user-supplied goal before sending it to the planner.
///
/// Returns the trimmed goal.
pub fn validate_goal(goal: &str) -> Result<&str, CoreError> {
    let trimmed = goal.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Goal must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_GOAL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Goal must be at most {MAX_GOAL_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn goal_is_trimmed() {
        assert_eq!(validate_goal("  learn rust  ").unwrap(), "learn rust");
    }

    #[test]
    fn blank_goal_is_rejected() {
        assert_matches!(validate_goal("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn overlong_goal_is_rejected() {
        let goal = "a".repeat(MAX_GOAL_LENGTH + 1);
        assert_matches!(validate_goal(&goal), Err(CoreError::Validation(_)));
        assert!(validate_goal(&"a".repeat(MAX_GOAL_LENGTH)).is_ok());
    }
}
