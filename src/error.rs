//! Error types for resource clients and the query layer.

use thiserror::Error;

/// Errors surfaced by resource clients.
///
/// Every variant is `Clone` so a single failure can be shared by all readers
/// waiting on the same in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// No record with this id exists in the collection.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: String, id: String },

    /// A record with this id already exists (only raised while seeding).
    #[error("{collection} record already exists: {id}")]
    Conflict { collection: String, id: String },

    /// The payload could not be turned into a record of this collection.
    #[error("invalid {collection} payload: {message}")]
    InvalidPayload { collection: String, message: String },

    /// Network or backend failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The collection lock was poisoned by a panicking writer.
    #[error("collection lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl ResourceError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        ResourceError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_payload(collection: &str, message: impl ToString) -> Self {
        ResourceError::InvalidPayload {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }

    /// Whether a read that failed with this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResourceError::Transport(_))
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ResourceError::NotFound { .. } => 404,
            ResourceError::Conflict { .. } => 409,
            ResourceError::InvalidPayload { .. } => 422,
            ResourceError::Transport(_) => 502,
            ResourceError::LockPoisoned(_) => 500,
        }
    }
}
