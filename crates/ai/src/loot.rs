//! Loot generation over an ordered list of chat models.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use questlog_core::error::GenerationError;
use questlog_core::loot::{LootDraft, LootSource};

use crate::openrouter::{ChatCompletion, ChatRequest};
use crate::parse::parse_model_json;

const LOOT_TEMPERATURE: f32 = 0.7;
const LOOT_MAX_TOKENS: u32 = 500;

fn loot_prompt(completed_task: &str) -> String {
    format!(
        r#"A hero completed: "{completed_task}".
Generate a fantasy loot item as JSON ONLY (keep description under 80 characters):
{{
  "itemName": "Creative fantasy item name",
  "description": "Brief description (max 80 chars)",
  "type": "Weapon|Armor|Scroll|Potion|Trinket",
  "rarity": "Common|Uncommon|Rare|Epic|Legendary (weighted: 40% Common, 30% Uncommon, 20% Rare, 8% Epic, 2% Legendary)",
  "imagePrompt": "Simple game icon: [item], fantasy RPG style, transparent background"
}}"#
    )
}

/// [`LootSource`] that asks each configured model in turn.
///
/// A rate-limited model is skipped immediately; any other failure waits
/// `retry_delay` before the next model is tried.
pub struct LootGenerator {
    chat: Arc<dyn ChatCompletion>,
    models: Vec<String>,
    retry_delay: Duration,
}

impl LootGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>, models: Vec<String>, retry_delay: Duration) -> Self {
        Self {
            chat,
            models,
            retry_delay,
        }
    }

    async fn try_model(&self, model: &str, prompt: &str) -> Result<LootDraft, GenerationError> {
        let request = ChatRequest {
            temperature: Some(LOOT_TEMPERATURE),
            max_tokens: Some(LOOT_MAX_TOKENS),
            ..ChatRequest::new(model, prompt)
        };
        let content = self.chat.complete(&request).await?;
        let draft: LootDraft = parse_model_json(model, &content)?;
        if draft.item_name.trim().is_empty() {
            return Err(GenerationError::MalformedResponse {
                backend: model.to_string(),
                reason: "itemName is empty".to_string(),
            });
        }
        Ok(draft)
    }
}

#[async_trait]
impl LootSource for LootGenerator {
    async fn generate_loot(&self, completed_task: &str) -> Result<LootDraft, GenerationError> {
        let prompt = loot_prompt(completed_task);
        let mut last_error = GenerationError::NoBackends;

        for (index, model) in self.models.iter().enumerate() {
            tracing::debug!(model, "Attempting loot generation");
            match self.try_model(model, &prompt).await {
                Ok(draft) => {
                    tracing::info!(model, item = %draft.item_name, "Generated loot");
                    return Ok(draft);
                }
                Err(e) => {
                    tracing::warn!(model, error = %e, "Loot model failed");
                    let rate_limited = e.is_rate_limited();
                    last_error = e;
                    let more_models = index + 1 < self.models.len();
                    if more_models && !rate_limited {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use questlog_core::loot::{ItemType, Rarity};

    use super::*;

    /// Replays one scripted result per call and records the models asked.
    struct ScriptedChat {
        replies: Mutex<Vec<Result<String, GenerationError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedChat {
        fn new(replies: Vec<Result<String, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn models(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.model.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedChat {
        async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(GenerationError::NoBackends))
        }
    }

    fn unavailable(model: &str, rate_limited: bool) -> Result<String, GenerationError> {
        Err(GenerationError::BackendUnavailable {
            backend: model.to_string(),
            reason: "boom".to_string(),
            rate_limited,
        })
    }

    const SWORD: &str = r#"```json
{"itemName": "Blade of Deadlines", "description": "Cuts through procrastination.",
 "type": "Weapon", "rarity": "Rare", "imagePrompt": "Simple game icon: sword"}
```"#;

    fn generator(chat: Arc<ScriptedChat>) -> LootGenerator {
        LootGenerator::new(
            chat,
            vec!["a".into(), "b".into(), "c".into()],
            Duration::from_millis(1000),
        )
    }

    #[tokio::test]
    async fn first_model_success() {
        let chat = ScriptedChat::new(vec![Ok(SWORD.to_string())]);
        let draft = generator(chat.clone()).generate_loot("Write a report").await.unwrap();

        assert_eq!(draft.item_name, "Blade of Deadlines");
        assert_eq!(draft.item_type, ItemType::Weapon);
        assert_eq!(draft.rarity, Rarity::Rare);
        assert_eq!(chat.models(), vec!["a"]);

        let request = chat.requests.lock().unwrap()[0].clone();
        assert!(request.prompt.contains("A hero completed: \"Write a report\""));
        assert_eq!(request.temperature, Some(LOOT_TEMPERATURE));
        assert_eq!(request.max_tokens, Some(LOOT_MAX_TOKENS));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_model_is_skipped_without_delay() {
        let chat = ScriptedChat::new(vec![unavailable("a", true), Ok(SWORD.to_string())]);
        let start = tokio::time::Instant::now();

        let draft = generator(chat.clone()).generate_loot("task").await.unwrap();

        assert_eq!(draft.item_name, "Blade of Deadlines");
        assert_eq!(chat.models(), vec!["a", "b"]);
        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn other_failures_wait_before_next_model() {
        let chat = ScriptedChat::new(vec![
            Ok("I cannot help with that.".to_string()),
            Ok(SWORD.to_string()),
        ]);
        let start = tokio::time::Instant::now();

        generator(chat.clone()).generate_loot("task").await.unwrap();

        assert_eq!(chat.models(), vec!["a", "b"]);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn all_models_failing_returns_last_error() {
        let chat = ScriptedChat::new(vec![
            unavailable("a", true),
            unavailable("b", true),
            unavailable("c", false),
        ]);

        let err = generator(chat.clone()).generate_loot("task").await.unwrap_err();

        assert_matches!(
            err,
            GenerationError::BackendUnavailable { backend, rate_limited: false, .. } if backend == "c"
        );
        assert_eq!(chat.models(), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn last_model_failure_returns_without_waiting() {
        let chat = ScriptedChat::new(vec![
            Ok("not json".to_string()),
            Ok("still not json".to_string()),
            Ok("nope".to_string()),
        ]);
        let start = tokio::time::Instant::now();

        let err = generator(chat.clone()).generate_loot("task").await.unwrap_err();

        assert_matches!(err, GenerationError::MalformedResponse { backend, .. } if backend == "c");
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn unknown_item_type_moves_to_next_model() {
        let bad = r#"{"itemName": "Ring", "description": "Shiny", "type": "Jewelry"}"#;
        let chat = ScriptedChat::new(vec![Ok(bad.to_string()), Ok(SWORD.to_string())]);
        let generator = LootGenerator::new(
            chat.clone(),
            vec!["a".into(), "b".into()],
            Duration::ZERO,
        );

        let draft = generator.generate_loot("task").await.unwrap();
        assert_eq!(draft.item_type, ItemType::Weapon);
        assert_eq!(chat.models(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn no_models_configured() {
        let chat = ScriptedChat::new(vec![]);
        let generator = LootGenerator::new(chat, Vec::new(), Duration::ZERO);
        assert_matches!(
            generator.generate_loot("task").await,
            Err(GenerationError::NoBackends)
        );
    }
}
