//! Image-generation backends.
//!
//! Each backend turns a prompt into raw image bytes. They are assembled into
//! an ordered chain from `IMAGE_BACKENDS`; the resolver in `questlog-core`
//! tries them in sequence.

mod cloudflare;
mod pollinations;
mod puter;

use std::sync::Arc;

use questlog_core::image_cache::ImageBackend;

use crate::config::AiConfig;

pub use cloudflare::CloudflareBackend;
pub use pollinations::PollinationsBackend;
pub use puter::PuterBackend;

/// Build the configured backend chain, skipping unknown names and backends
/// whose credentials are missing.
pub fn build_image_backends(config: &AiConfig) -> Vec<Arc<dyn ImageBackend>> {
    let mut backends: Vec<Arc<dyn ImageBackend>> = Vec::new();
    for name in &config.image_backends {
        match name.to_ascii_lowercase().as_str() {
            "cloudflare" => match (&config.cloudflare_account_id, &config.cloudflare_api_token) {
                (Some(account_id), Some(token)) => backends.push(Arc::new(
                    CloudflareBackend::new(account_id, token, config.image_timeout),
                )),
                _ => tracing::warn!(
                    "Cloudflare image backend requested but CLOUDFLARE_ACCOUNT_ID or CLOUDFLARE_API_TOKEN is unset"
                ),
            },
            "puter" => backends.push(Arc::new(PuterBackend::new(
                config.puter_api_key.clone(),
                config.image_size,
                config.image_timeout,
            ))),
            "pollinations" => backends.push(Arc::new(PollinationsBackend::new(
                config.image_size,
                config.image_timeout,
            ))),
            other => tracing::warn!(backend = other, "Unknown image backend, skipping"),
        }
    }
    backends
}
