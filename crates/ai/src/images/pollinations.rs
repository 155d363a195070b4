use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use questlog_core::error::GenerationError;
use questlog_core::image_cache::ImageBackend;

use crate::http::{client_with_timeout, require_success, transport_error};

const NAME: &str = "pollinations";
const BASE_URL: &str = "https://image.pollinations.ai/prompt/";

/// Pollinations URL-based generation. No credentials required.
pub struct PollinationsBackend {
    client: Client,
    size: u32,
}

impl PollinationsBackend {
    pub fn new(size: u32, timeout: Duration) -> Self {
        Self {
            client: client_with_timeout(timeout),
            size,
        }
    }
}

/// `https://image.pollinations.ai/prompt/<encoded prompt>?width=..&height=..&nologo=true`
fn prompt_url(prompt: &str, size: u32) -> Result<Url, GenerationError> {
    let malformed = |reason: String| GenerationError::MalformedResponse {
        backend: NAME.to_string(),
        reason,
    };
    let mut url = Url::parse(BASE_URL).map_err(|e| malformed(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| malformed("base URL cannot take path segments".to_string()))?
        .pop_if_empty()
        .push(prompt);
    url.query_pairs_mut()
        .append_pair("width", &size.to_string())
        .append_pair("height", &size.to_string())
        .append_pair("nologo", "true");
    Ok(url)
}

#[async_trait]
impl ImageBackend for PollinationsBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let url = prompt_url(prompt, self.size)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;
        let response = require_success(NAME, response).await?;
        let bytes = response.bytes().await.map_err(|e| transport_error(NAME, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_a_single_encoded_segment() {
        let url = prompt_url("Simple game icon: sword/shield, 50% off?", 512).unwrap();
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "prompt");
        assert!(!segments[1].contains('/'));
        assert!(!segments[1].contains('?'));
        assert_eq!(url.query(), Some("width=512&height=512&nologo=true"));
    }
}
