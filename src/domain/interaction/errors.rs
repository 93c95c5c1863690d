use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure classes for interaction mutations.
///
/// Every backend failure is folded into exactly one of these classes at the
/// adapter boundary, so the rest of the engine decides retry and rollback
/// behavior without ever inspecting transport details. Only
/// [`InteractionError::Transient`] is ever retried.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionError {
    /// No valid session; the mutation was aborted before any local change.
    #[error("not signed in")]
    Unauthenticated,

    /// Timeout, connection failure, or gateway-class response. Retriable.
    #[error("transient backend failure: {0}")]
    Transient(String),

    /// The backend (or local validation) rejected the input outright.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The session is valid but not allowed to perform this mutation.
    #[error("permission denied: {0}")]
    Permission(String),

    /// The backend asked us to back off. Not retried automatically.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Anything unclassified. Treated conservatively as non-retriable.
    #[error("backend failure: {0}")]
    Unknown(String),
}

impl InteractionError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// User-safe message without implementation details.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Sign in to do that".into(),
            Self::Transient(_) => "Connection trouble, your change may not be saved yet".into(),
            Self::Validation(msg) => msg.clone(),
            Self::Permission(_) => "You don't have permission to do that".into(),
            Self::RateLimited => "Slow down a little and try again".into(),
            Self::Unknown(_) => "Something went wrong".into(),
        }
    }
}
