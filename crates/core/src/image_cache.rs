//! Artwork resolution for inventory items.
//!
//! An item that already carries an `image_url` is served from storage and
//! never regenerated. Otherwise its `image_prompt` is sent through an ordered
//! chain of [`ImageBackend`]s until one produces bytes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::loot::LootItem;

/// A single image-generation provider.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}

/// Outcome of resolving artwork for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResolution {
    /// The item already has stored artwork.
    Cached { image_url: String },
    /// Fresh image data; the caller stores it and records the reference.
    Generated { bytes: Vec<u8> },
    /// Neither stored artwork nor a prompt exists.
    Unavailable,
}

/// Tries image backends in order, returning the first success.
#[derive(Clone, Default)]
pub struct ImageCacheResolver {
    backends: Vec<Arc<dyn ImageBackend>>,
}

impl ImageCacheResolver {
    pub fn new(backends: Vec<Arc<dyn ImageBackend>>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Resolve artwork for an inventory item.
    pub async fn resolve(&self, item: &LootItem) -> Result<ImageResolution, GenerationError> {
        if let Some(url) = item.image_url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(ImageResolution::Cached {
                image_url: url.to_string(),
            });
        }
        match item.image_prompt.as_deref().map(str::trim) {
            Some(prompt) if !prompt.is_empty() => {
                let bytes = self.generate(prompt).await?;
                Ok(ImageResolution::Generated { bytes })
            }
            _ => Ok(ImageResolution::Unavailable),
        }
    }

    /// Run `prompt` through the backend chain.
    ///
    /// Returns the last backend's error when every backend fails.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let mut last_error = GenerationError::NoBackends;
        for backend in &self.backends {
            match backend.generate_image(prompt).await {
                Ok(bytes) if bytes.is_empty() => {
                    tracing::warn!(backend = backend.name(), "Image backend returned no data");
                    last_error = GenerationError::EmptyResponse {
                        backend: backend.name().to_string(),
                    };
                }
                Ok(bytes) => {
                    tracing::info!(
                        backend = backend.name(),
                        size = bytes.len(),
                        "Generated image"
                    );
                    return Ok(bytes);
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "Image backend failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
