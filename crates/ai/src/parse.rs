//! Extraction of JSON payloads from free-form model output.
//!
//! Models wrap JSON in markdown fences, leak chat-template control tokens
//! and add prose around the payload. Cleanup strips all three before
//! parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use questlog_core::error::GenerationError;

/// Chat-template tokens some free models echo back verbatim.
const CONTROL_TOKENS: [&str; 8] = [
    "<s>", "</s>", "[OUT]", "[/OUT]", "[INST]", "[/INST]", "[B_INST]", "[/B_INST]",
];

/// First `[` to last `]`, or first `{` to last `}`, whichever starts first.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]*\]|\{[\s\S]*\}").expect("valid JSON span regex"));

/// Strip code fences and control tokens, trim, and narrow to the JSON span
/// if one is present.
///
/// Returns `None` when nothing is left after cleanup.
pub fn clean_model_output(content: &str) -> Option<String> {
    let mut cleaned = content.replace("```json", "").replace("```", "");
    for token in CONTROL_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let span = JSON_SPAN
        .find(cleaned)
        .map(|m| m.as_str())
        .unwrap_or(cleaned);
    Some(span.to_string())
}

/// Clean `content` and deserialize it as `T`.
pub fn parse_model_json<T: DeserializeOwned>(
    backend: &str,
    content: &str,
) -> Result<T, GenerationError> {
    if content.trim().is_empty() {
        return Err(GenerationError::EmptyResponse {
            backend: backend.to_string(),
        });
    }
    let cleaned = clean_model_output(content).ok_or_else(|| GenerationError::EmptyResponse {
        backend: backend.to_string(),
    })?;
    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::debug!(backend, cleaned = %cleaned, "Model output is not valid JSON");
        GenerationError::MalformedResponse {
            backend: backend.to_string(),
            reason: e.to_string(),
        }
    })
}
