//! AI backend configuration loaded from environment variables.

use std::time::Duration;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Loot models, tried in order.
pub const DEFAULT_LOOT_MODELS: [&str; 3] = [
    "google/gemini-2.0-flash-exp:free",
    "meta-llama/llama-3.1-8b-instruct:free",
    "mistralai/mistral-7b-instruct:free",
];

/// Model used to decompose goals into quests.
pub const DEFAULT_PLANNER_MODEL: &str = "mistralai/mistral-7b-instruct:free";

/// Image backends, tried in order.
pub const DEFAULT_IMAGE_BACKENDS: [&str; 2] = ["puter", "pollinations"];

/// Text- and image-generation settings.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub loot_models: Vec<String>,
    pub planner_model: String,
    /// Pause before the next loot model after a non-rate-limit failure.
    pub loot_retry_delay: Duration,
    pub text_timeout: Duration,
    pub image_backends: Vec<String>,
    pub cloudflare_account_id: Option<String>,
    pub cloudflare_api_token: Option<String>,
    pub puter_api_key: Option<String>,
    pub image_timeout: Duration,
    /// Width and height of generated artwork in pixels.
    pub image_size: u32,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var                 | Default                          |
    /// |-------------------------|----------------------------------|
    /// | `OPENROUTER_API_KEY`    | empty                            |
    /// | `OPENROUTER_BASE_URL`   | `https://openrouter.ai/api/v1`   |
    /// | `LOOT_MODELS`           | gemini, llama, mistral (free)    |
    /// | `PLANNER_MODEL`         | `mistralai/mistral-7b-instruct:free` |
    /// | `LOOT_RETRY_DELAY_MS`   | `1000`                           |
    /// | `TEXT_TIMEOUT_SECS`     | `60`                             |
    /// | `IMAGE_BACKENDS`        | `puter,pollinations`             |
    /// | `CLOUDFLARE_ACCOUNT_ID` | unset                            |
    /// | `CLOUDFLARE_API_TOKEN`  | unset                            |
    /// | `PUTER_API_KEY`         | unset                            |
    /// | `IMAGE_TIMEOUT_SECS`    | `30`                             |
    /// | `IMAGE_SIZE`            | `512`                            |
    pub fn from_env() -> Self {
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        if openrouter_api_key.is_empty() {
            tracing::warn!("OPENROUTER_API_KEY is not set; text generation will fail over to fallbacks");
        }

        Self {
            openrouter_api_key,
            openrouter_base_url: std::env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            loot_models: env_list("LOOT_MODELS", &DEFAULT_LOOT_MODELS),
            planner_model: std::env::var("PLANNER_MODEL")
                .unwrap_or_else(|_| DEFAULT_PLANNER_MODEL.to_string()),
            loot_retry_delay: Duration::from_millis(env_parse("LOOT_RETRY_DELAY_MS", 1000)),
            text_timeout: Duration::from_secs(env_parse("TEXT_TIMEOUT_SECS", 60)),
            image_backends: env_list("IMAGE_BACKENDS", &DEFAULT_IMAGE_BACKENDS),
            cloudflare_account_id: env_opt("CLOUDFLARE_ACCOUNT_ID"),
            cloudflare_api_token: env_opt("CLOUDFLARE_API_TOKEN"),
            puter_api_key: env_opt("PUTER_API_KEY"),
            image_timeout: Duration::from_secs(env_parse("IMAGE_TIMEOUT_SECS", 30)),
            image_size: env_parse("IMAGE_SIZE", 512),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: String::new(),
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            loot_models: DEFAULT_LOOT_MODELS.iter().map(|m| m.to_string()).collect(),
            planner_model: DEFAULT_PLANNER_MODEL.to_string(),
            loot_retry_delay: Duration::from_millis(1000),
            text_timeout: Duration::from_secs(60),
            image_backends: DEFAULT_IMAGE_BACKENDS.iter().map(|b| b.to_string()).collect(),
            cloudflare_account_id: None,
            cloudflare_api_token: None,
            puter_api_key: None,
            image_timeout: Duration::from_secs(30),
            image_size: 512,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a comma-separated list, dropping blanks.
fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => split_list(&raw),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
