use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::dto::CommentOutcome;
use crate::application::session_gate::use_case::SessionGate;
use crate::config::{EngineConfig, InteractionTuning};
use crate::domain::interaction::backend::{CreateComment, InteractionBackend};
use crate::domain::interaction::comment::{self, Comment, CommentSync};
use crate::domain::interaction::errors::InteractionError;
use crate::domain::interaction::stats::EntityRef;
use crate::domain::interaction::store::EntityStore;

/// Optimistic comment submission with sequential retry.
///
/// The temporary record goes in at the head of the list before the first
/// request fires; what happens to it afterwards depends entirely on the
/// failure class. Transient failures back off and retry up to the tuned
/// attempt ceiling, then park the record as pending-sync without touching
/// the counter. Everything else removes the record and takes the counter
/// increment back.
pub struct SubmitCommentUseCase {
    store: Arc<EntityStore>,
    backend: Arc<dyn InteractionBackend>,
    gate: Arc<SessionGate>,
    config: Arc<EngineConfig>,
}

impl SubmitCommentUseCase {
    pub fn new(
        store: Arc<EntityStore>,
        backend: Arc<dyn InteractionBackend>,
        gate: Arc<SessionGate>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            store,
            backend,
            gate,
            config,
        }
    }

    pub async fn execute(
        &self,
        entity: EntityRef,
        text: &str,
    ) -> Result<CommentOutcome, InteractionError> {
        let session = self.gate.require_session().await?;
        let tuning = self.config.tuning_for(entity.kind);
        // Validation happens before the optimistic insert, so rejected input
        // never flashes into the list.
        let text = comment::validate_text(text, tuning.max_comment_chars)?;

        let draft = Comment::optimistic(entity, session.user_id, text);
        self.store.insert_comment(draft.clone()).await;
        self.drive(draft, tuning).await
    }

    /// Re-enter the submission loop for a record parked as pending-sync.
    pub async fn retry(
        &self,
        entity: EntityRef,
        comment_id: uuid::Uuid,
    ) -> Result<CommentOutcome, InteractionError> {
        self.gate.require_session().await?;
        let Some(pending) = self.store.comment(entity, comment_id).await else {
            return Err(InteractionError::Validation(
                "no pending comment to retry".into(),
            ));
        };
        if pending.sync == CommentSync::Confirmed {
            return Ok(CommentOutcome::Confirmed(pending));
        }
        let draft = self
            .store
            .set_comment_sync(entity, comment_id, CommentSync::Optimistic)
            .await
            .unwrap_or(pending);
        self.drive(draft, self.config.tuning_for(entity.kind)).await
    }

    /// Drop a pending record on the author's request. This is the one path
    /// where the optimistic counter increment is explicitly taken back.
    pub async fn discard(&self, entity: EntityRef, comment_id: uuid::Uuid) -> bool {
        self.store.remove_comment(entity, comment_id).await
    }

    async fn drive(
        &self,
        draft: Comment,
        tuning: InteractionTuning,
    ) -> Result<CommentOutcome, InteractionError> {
        let request = CreateComment {
            entity: draft.entity,
            user_id: draft.author_id,
            text: draft.text.clone(),
            idempotency_key: draft.id,
        };
        let mut delay = Duration::from_millis(tuning.comment_backoff_base_ms);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.backend.create_comment(&request).await {
                Ok(record) => {
                    let confirmed = self
                        .store
                        .confirm_comment(draft.entity, draft.id, &record)
                        .await
                        .unwrap_or_else(|| Comment {
                            id: record.id,
                            entity: draft.entity,
                            author_id: record.author_id,
                            text: record.text.clone(),
                            created_at: record.created_at,
                            sync: CommentSync::Confirmed,
                        });
                    return Ok(CommentOutcome::Confirmed(confirmed));
                }
                Err(e) if e.is_retriable() && attempt < tuning.comment_attempts => {
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient comment failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) if e.is_retriable() => {
                    warn!(
                        attempts = attempt,
                        error = %e,
                        "comment submission exhausted retries, parking as pending sync"
                    );
                    let parked = self
                        .store
                        .set_comment_sync(draft.entity, draft.id, CommentSync::PendingSync)
                        .await
                        .unwrap_or_else(|| {
                            let mut c = draft.clone();
                            c.sync = CommentSync::PendingSync;
                            c
                        });
                    return Ok(CommentOutcome::PendingSync(parked));
                }
                Err(e) => {
                    self.store.remove_comment(draft.entity, draft.id).await;
                    return Err(e);
                }
            }
        }
    }
}
