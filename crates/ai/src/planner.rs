//! Goal decomposition into quest steps.

use std::sync::Arc;

use async_trait::async_trait;

use questlog_core::error::GenerationError;
use questlog_core::quest::{QuestDraft, QuestPlanner};

use crate::openrouter::{ChatCompletion, ChatRequest};
use crate::parse::parse_model_json;

fn planner_prompt(goal: &str) -> String {
    format!(
        r#"You are a Project Dungeon Master. A user wants to achieve the following goal: "{goal}".
Break this goal down into 5 to 7 sequential, actionable steps.
For each step, provide a fantasy-themed "title", a short narrative "description", and a concrete real-world "task".
Return your response ONLY as a valid JSON array of objects. Do not include any other text or explanation."#
    )
}

/// [`QuestPlanner`] backed by a single chat model.
pub struct AiQuestPlanner {
    chat: Arc<dyn ChatCompletion>,
    model: String,
}

impl AiQuestPlanner {
    pub fn new(chat: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }
}

#[async_trait]
impl QuestPlanner for AiQuestPlanner {
    async fn plan_quests(&self, goal: &str) -> Result<Vec<QuestDraft>, GenerationError> {
        let request = ChatRequest::new(&self.model, planner_prompt(goal));
        let content = self.chat.complete(&request).await?;
        let drafts: Vec<QuestDraft> = parse_model_json(&self.model, &content)?;

        if drafts.is_empty() {
            return Err(GenerationError::MalformedResponse {
                backend: self.model.clone(),
                reason: "plan contains no steps".to_string(),
            });
        }
        if let Some(step) = drafts
            .iter()
            .position(|d| d.title.trim().is_empty() || d.task.trim().is_empty())
        {
            return Err(GenerationError::MalformedResponse {
                backend: self.model.clone(),
                reason: format!("step {} is missing a title or task", step + 1),
            });
        }

        tracing::info!(model = %self.model, steps = drafts.len(), "Planned quests");
        Ok(drafts)
    }
}
