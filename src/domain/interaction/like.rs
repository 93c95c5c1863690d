use serde::{Deserialize, Serialize};

/// Like state for one (user, entity) pair as currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSnapshot {
    pub has_liked: bool,
    pub likes_count: u64,
}

/// Result of a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "state")]
pub enum ToggleOutcome {
    /// The toggle reached the backend and local state now carries server truth.
    Applied(LikeSnapshot),
    /// A toggle for this (entity, user) pair was already in flight; this call
    /// changed nothing and reports the state the pending toggle will settle.
    Coalesced(LikeSnapshot),
}

impl ToggleOutcome {
    pub fn snapshot(&self) -> LikeSnapshot {
        match self {
            Self::Applied(s) | Self::Coalesced(s) => *s,
        }
    }
}
