use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backing store rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures from an outbound text- or image-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The backend answered but the payload had no usable content.
    #[error("{backend} returned an empty response")]
    EmptyResponse { backend: String },

    /// The payload could not be parsed after cleanup.
    #[error("{backend} returned a malformed response: {reason}")]
    MalformedResponse { backend: String, reason: String },

    /// The call itself failed (network, non-2xx status, timeout).
    #[error("{backend} is unavailable: {reason}")]
    BackendUnavailable {
        backend: String,
        reason: String,
        /// `true` when the backend answered HTTP 429.
        rate_limited: bool,
    },

    /// No backend is configured for this capability.
    #[error("no generation backend is configured")]
    NoBackends,
}

impl GenerationError {
    /// Whether the failure was caused by upstream rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            GenerationError::BackendUnavailable {
                rate_limited: true,
                ..
            }
        )
    }
}
