use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::errors::InteractionError;
use super::stats::{EntityRef, StatsPayload};
use crate::domain::shared::pagination::PaginationRequest;

/// What the backend did with a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Liked,
    Unliked,
}

/// Response to `POST /interactions/{entity}/toggle-like`. The count is
/// authoritative and already includes concurrent likes by other users.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToggleReceipt {
    pub action: LikeAction,
    pub count: u64,
}

/// Comment-creation request as the engine hands it to the adapter.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub entity: EntityRef,
    pub user_id: Uuid,
    pub text: String,
    /// Client-supplied; lets the backend drop duplicate submissions after an
    /// ambiguous transport failure.
    pub idempotency_key: Uuid,
}

/// Server-confirmed comment record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Authoritative entity document with denormalized stats, as returned by
/// `GET /entities/{id}`. Stats arrive in either wire shape; see
/// [`StatsPayload`].
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDocument {
    pub id: Uuid,
    pub stats: StatsPayload,
}

/// Port to the hosted backend. One implementation speaks HTTP; tests use
/// scripted in-memory stand-ins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionBackend: Send + Sync {
    /// Toggle the caller's like on an entity. Idempotent per call; the
    /// receipt carries the authoritative post-toggle count.
    async fn toggle_like(
        &self,
        entity: EntityRef,
        user_id: Uuid,
    ) -> Result<ToggleReceipt, InteractionError>;

    async fn create_comment(
        &self,
        request: &CreateComment,
    ) -> Result<CommentRecord, InteractionError>;

    async fn fetch_entity(&self, entity: EntityRef) -> Result<EntityDocument, InteractionError>;

    async fn fetch_comments(
        &self,
        entity: EntityRef,
        page: PaginationRequest,
    ) -> Result<Vec<CommentRecord>, InteractionError>;
}
