use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InteractionError;
use super::stats::EntityRef;

/// Where a locally displayed comment sits in its sync lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSync {
    /// Created locally; the creation request has not been confirmed yet.
    Optimistic,
    /// Server-confirmed record.
    Confirmed,
    /// Transient retries exhausted. Still visible, waiting for a manual
    /// retry or an explicit discard by the author.
    PendingSync,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub entity: EntityRef,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub sync: CommentSync,
}

impl Comment {
    /// Synthesize the local placeholder inserted ahead of server confirmation.
    ///
    /// The locally generated id doubles as the idempotency key for the
    /// creation request, so a retry after an ambiguous failure cannot create
    /// a duplicate server-side.
    pub fn optimistic(entity: EntityRef, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            entity,
            author_id,
            text,
            created_at: Utc::now(),
            sync: CommentSync::Optimistic,
        }
    }

    pub fn is_optimistic(&self) -> bool {
        self.sync != CommentSync::Confirmed
    }
}

/// Trim and bound comment text before any local state is touched.
pub fn validate_text(raw: &str, max_chars: usize) -> Result<String, InteractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InteractionError::Validation("comment text is empty".into()));
    }
    if trimmed.chars().count() > max_chars {
        return Err(InteractionError::Validation(format!(
            "comment exceeds {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}
