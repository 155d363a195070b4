//! Shared reqwest plumbing for the text and image backends.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use questlog_core::error::GenerationError;

/// Build a client with a per-request timeout.
pub fn client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a transport failure (DNS, connect, timeout) to `BackendUnavailable`.
pub fn transport_error(backend: &str, error: reqwest::Error) -> GenerationError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };
    GenerationError::BackendUnavailable {
        backend: backend.to_string(),
        reason,
        rate_limited: false,
    }
}

/// Pass 2xx responses through; turn anything else into `BackendUnavailable`,
/// flagging HTTP 429 as rate limited.
pub async fn require_success(backend: &str, response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(backend, status, &body))
}

pub(crate) fn status_error(backend: &str, status: StatusCode, body: &str) -> GenerationError {
    let snippet: String = body.chars().take(200).collect();
    GenerationError::BackendUnavailable {
        backend: backend.to_string(),
        reason: format!("HTTP {}: {}", status.as_u16(), snippet.trim()),
        rate_limited: status == StatusCode::TOO_MANY_REQUESTS,
    }
}
