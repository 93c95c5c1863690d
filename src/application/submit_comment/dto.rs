use serde::Serialize;

use crate::domain::interaction::comment::Comment;

/// Terminal state of a submission from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "comment")]
pub enum CommentOutcome {
    /// Server-confirmed; the local record now carries the server id.
    Confirmed(Comment),
    /// Retries exhausted on a transient failure; the record stays visible
    /// awaiting a manual retry or discard.
    PendingSync(Comment),
}

impl CommentOutcome {
    pub fn comment(&self) -> &Comment {
        match self {
            Self::Confirmed(c) | Self::PendingSync(c) => c,
        }
    }
}
