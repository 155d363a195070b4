use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use questlog_core::error::GenerationError;
use questlog_core::image_cache::ImageBackend;

use crate::http::{client_with_timeout, require_success, transport_error};

const NAME: &str = "cloudflare";
const MODEL: &str = "@cf/stabilityai/stable-diffusion-xl-base-1.0";

/// Cloudflare Workers AI text-to-image.
pub struct CloudflareBackend {
    client: Client,
    url: String,
    api_token: String,
}

impl CloudflareBackend {
    pub fn new(account_id: &str, api_token: &str, timeout: Duration) -> Self {
        Self {
            client: client_with_timeout(timeout),
            url: run_url(account_id),
            api_token: api_token.to_string(),
        }
    }
}

fn run_url(account_id: &str) -> String {
    format!("https://api.cloudflare.com/client/v4/accounts/{account_id}/ai/run/{MODEL}")
}

#[async_trait]
impl ImageBackend for CloudflareBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;
        let response = require_success(NAME, response).await?;
        let bytes = response.bytes().await.map_err(|e| transport_error(NAME, e))?;
        Ok(bytes.to_vec())
    }
}
