use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use questlog_core::error::GenerationError;
use questlog_core::image_cache::ImageBackend;

use crate::http::{client_with_timeout, require_success, transport_error};

const NAME: &str = "puter";
const TXT2IMG_URL: &str = "https://api.puter.com/drivers/txt2img";

#[derive(Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
}

/// Puter `txt2img` driver.
pub struct PuterBackend {
    client: Client,
    api_key: Option<String>,
    size: u32,
}

impl PuterBackend {
    pub fn new(api_key: Option<String>, size: u32, timeout: Duration) -> Self {
        Self {
            client: client_with_timeout(timeout),
            api_key,
            size,
        }
    }
}

#[async_trait]
impl ImageBackend for PuterBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let body = Txt2ImgRequest {
            prompt,
            width: self.size,
            height: self.size,
        };
        let response = self
            .client
            .post(TXT2IMG_URL)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(NAME, e))?;
        let response = require_success(NAME, response).await?;
        let bytes = response.bytes().await.map_err(|e| transport_error(NAME, e))?;
        Ok(bytes.to_vec())
    }
}
