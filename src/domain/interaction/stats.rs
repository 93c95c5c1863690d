use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InteractionError;

/// Content families that carry interaction counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Vibe,
    Mix,
    Post,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vibe => "vibe",
            Self::Mix => "mix",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vibe" => Ok(Self::Vibe),
            "mix" => Ok(Self::Mix),
            "post" => Ok(Self::Post),
            other => Err(InteractionError::Validation(format!(
                "unknown entity kind: {other:?}"
            ))),
        }
    }
}

/// Identity of one piece of content across the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    /// Durable-storage key for this entity's persisted like counter.
    pub fn shadow_key(&self) -> String {
        format!("{}_like_count_{}", self.kind, self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Normalized denormalized counters for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionStats {
    pub likes_count: u64,
    pub comments_count: u64,
}

/// Stats as the backend returns them.
///
/// Older entity documents encode stats as a two-slot array
/// (`[likes, comments]`, numbers or numeric strings); newer ones use an
/// object (`{total_likes, total_comments}`). Both shapes are accepted here,
/// at the single deserialization boundary, so nothing downstream ever
/// branches on shape again.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Object {
        total_likes: CountValue,
        total_comments: CountValue,
    },
    Legacy(Vec<CountValue>),
}

/// A counter slot as serialized by the backend: a number, or a number in a
/// string, a leftover from the oldest document generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CountValue {
    Number(i64),
    Text(String),
}

impl CountValue {
    fn as_count(&self) -> Result<u64, InteractionError> {
        let raw = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                InteractionError::Validation(format!("non-numeric counter value: {s:?}"))
            })?,
        };
        // Counters never display below zero, whatever the document says.
        Ok(raw.max(0) as u64)
    }
}

impl StatsPayload {
    pub fn normalize(&self) -> Result<InteractionStats, InteractionError> {
        match self {
            Self::Object {
                total_likes,
                total_comments,
            } => Ok(InteractionStats {
                likes_count: total_likes.as_count()?,
                comments_count: total_comments.as_count()?,
            }),
            Self::Legacy(slots) => {
                let [likes, comments] = slots.as_slice() else {
                    return Err(InteractionError::Validation(format!(
                        "legacy stats array has {} slots, expected 2",
                        slots.len()
                    )));
                };
                Ok(InteractionStats {
                    likes_count: likes.as_count()?,
                    comments_count: comments.as_count()?,
                })
            }
        }
    }
}
