//! Embedder-facing facade.
//!
//! Views call the engine; the engine runs the use cases, converts every
//! mutation error into a deduplicated notice at this boundary, and fans out
//! reconciliation events over the broadcast bus. Nothing below this module
//! talks to the user.

pub mod events;
pub mod notices;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::refresh_stats::use_case::RefreshStatsUseCase;
use crate::application::session_gate::use_case::SessionGate;
use crate::application::submit_comment::dto::CommentOutcome;
use crate::application::submit_comment::use_case::SubmitCommentUseCase;
use crate::application::toggle_like::use_case::ToggleLikeUseCase;
use crate::config::EngineConfig;
use crate::domain::interaction::backend::InteractionBackend;
use crate::domain::interaction::comment::Comment;
use crate::domain::interaction::errors::InteractionError;
use crate::domain::interaction::like::{LikeSnapshot, ToggleOutcome};
use crate::domain::interaction::stats::{EntityRef, InteractionStats};
use crate::domain::interaction::store::EntityStore;
use crate::domain::session::entity::Session;
use crate::domain::session::provider::SessionProvider;
use crate::domain::shared::pagination::PaginationRequest;
use crate::infrastructure::shadow::traits::CounterShadow;
use crate::infrastructure::throttle::clock::Clock;
use crate::infrastructure::throttle::debounce::Debouncer;
use crate::infrastructure::throttle::session_limiter::{SessionCheckLimiter, ThrottleLimits};
use self::events::{EngineEvent, EventBus, NoticeLevel};
use self::notices::NoticeCenter;

pub struct InteractionEngine {
    store: Arc<EntityStore>,
    backend: Arc<dyn InteractionBackend>,
    gate: Arc<SessionGate>,
    toggles: ToggleLikeUseCase,
    comments: SubmitCommentUseCase,
    refresher: RefreshStatsUseCase,
    shadow: Arc<dyn CounterShadow>,
    notices: NoticeCenter,
    bus: EventBus,
}

impl InteractionEngine {
    pub fn new(
        config: EngineConfig,
        backend: Arc<dyn InteractionBackend>,
        sessions: Arc<dyn SessionProvider>,
        shadow: Arc<dyn CounterShadow>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let bus = EventBus::new(config.event_capacity);
        let notices = NoticeCenter::new(
            bus.clone(),
            clock.clone(),
            Duration::from_secs(config.notice_dedup_window_secs),
        );
        let limiter = Arc::new(SessionCheckLimiter::new(
            ThrottleLimits {
                max_per_window: config.session_checks_per_minute,
                window: Duration::from_secs(60),
                max_concurrent: config.session_check_concurrency,
            },
            clock.clone(),
        ));
        let gate = Arc::new(SessionGate::new(sessions, limiter));
        let store = Arc::new(EntityStore::new());
        let toggles = ToggleLikeUseCase::new(
            store.clone(),
            backend.clone(),
            shadow.clone(),
            gate.clone(),
        );
        let comments = SubmitCommentUseCase::new(
            store.clone(),
            backend.clone(),
            gate.clone(),
            config.clone(),
        );
        let refresher = RefreshStatsUseCase::new(
            store.clone(),
            backend.clone(),
            shadow.clone(),
            Debouncer::new(Duration::from_millis(config.visibility_debounce_ms), clock),
        );
        Self {
            store,
            backend,
            gate,
            toggles,
            comments,
            refresher,
            shadow,
            notices,
            bus,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.bus.subscribe()
    }

    /// Push a session after an in-app login, or clear it on logout.
    pub async fn set_session(&self, session: Option<Session>) {
        self.gate.set_session(session).await;
    }

    /// Pre-seed an entity's like counter from the persisted shadow, so a
    /// freshly mounted view shows the last known value instead of zero while
    /// the authoritative fetch is still out.
    pub async fn hydrate(&self, entity: EntityRef) {
        match self.shadow.load(&entity.shadow_key()).await {
            Ok(Some(count)) => {
                debug!(entity = %entity, count, "hydrated counter from shadow");
                self.store.seed_likes(entity, count).await;
            }
            Ok(None) => {}
            Err(e) => warn!(entity = %entity, error = %e, "counter shadow unreadable"),
        }
    }

    pub async fn toggle_like(&self, entity: EntityRef) -> Result<ToggleOutcome, InteractionError> {
        match self.toggles.execute(entity).await {
            Ok(outcome) => {
                if let ToggleOutcome::Applied(snapshot) = outcome {
                    self.bus
                        .publish(EngineEvent::LikeReconciled { entity, snapshot });
                    self.refresh_after_mutation(entity).await;
                }
                Ok(outcome)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub async fn submit_comment(
        &self,
        entity: EntityRef,
        text: &str,
    ) -> Result<CommentOutcome, InteractionError> {
        let outcome = self.comments.execute(entity, text).await;
        self.finish_comment(entity, outcome).await
    }

    /// Re-submit a comment parked as pending-sync.
    pub async fn retry_comment(
        &self,
        entity: EntityRef,
        comment_id: Uuid,
    ) -> Result<CommentOutcome, InteractionError> {
        let outcome = self.comments.retry(entity, comment_id).await;
        self.finish_comment(entity, outcome).await
    }

    /// Drop a pending-sync comment on the author's request.
    pub async fn discard_comment(&self, entity: EntityRef, comment_id: Uuid) -> bool {
        self.comments.discard(entity, comment_id).await
    }

    pub async fn refresh_stats(
        &self,
        entity: EntityRef,
    ) -> Result<InteractionStats, InteractionError> {
        match self.refresher.execute(entity).await {
            Ok(stats) => {
                self.bus
                    .publish(EngineEvent::StatsReconciled { entity, stats });
                Ok(stats)
            }
            Err(e) => {
                warn!(entity = %entity, error = %e, "stats refresh failed");
                Err(e)
            }
        }
    }

    /// Debounced refresh for tab-refocus; rapid focus/blur cycles collapse
    /// into one fetch.
    pub async fn on_visibility_regained(
        &self,
        entity: EntityRef,
    ) -> Result<Option<InteractionStats>, InteractionError> {
        match self.refresher.on_visibility_regained(entity).await {
            Ok(Some(stats)) => {
                self.bus
                    .publish(EngineEvent::StatsReconciled { entity, stats });
                Ok(Some(stats))
            }
            other => other,
        }
    }

    /// Fetch a comment page and merge it under any locally pending records.
    pub async fn load_comments(
        &self,
        entity: EntityRef,
        page: PaginationRequest,
    ) -> Result<Vec<Comment>, InteractionError> {
        let records = self.backend.fetch_comments(entity, page).await?;
        Ok(self.store.merge_comment_page(entity, &records).await)
    }

    pub async fn comments(&self, entity: EntityRef) -> Vec<Comment> {
        self.store.comments(entity).await
    }

    pub async fn like_snapshot(&self, entity: EntityRef) -> LikeSnapshot {
        self.store.like_snapshot(entity).await
    }

    pub async fn stats(&self, entity: EntityRef) -> InteractionStats {
        self.store.stats(entity).await
    }

    async fn finish_comment(
        &self,
        entity: EntityRef,
        outcome: Result<CommentOutcome, InteractionError>,
    ) -> Result<CommentOutcome, InteractionError> {
        match outcome {
            Ok(CommentOutcome::Confirmed(comment)) => {
                self.bus.publish(EngineEvent::CommentConfirmed {
                    entity,
                    comment_id: comment.id,
                });
                self.refresh_after_mutation(entity).await;
                Ok(CommentOutcome::Confirmed(comment))
            }
            Ok(CommentOutcome::PendingSync(comment)) => {
                self.bus.publish(EngineEvent::CommentPendingSync {
                    entity,
                    comment_id: comment.id,
                });
                self.notices.publish(
                    NoticeLevel::Error,
                    "Your comment hasn't synced yet. You can retry or discard it",
                );
                Ok(CommentOutcome::PendingSync(comment))
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Every mutation ends with a resync against server truth; a failure
    /// here degrades to the already-reconciled local state.
    async fn refresh_after_mutation(&self, entity: EntityRef) {
        match self.refresher.execute(entity).await {
            Ok(stats) => self
                .bus
                .publish(EngineEvent::StatsReconciled { entity, stats }),
            Err(e) => debug!(entity = %entity, error = %e, "post-mutation stats refresh failed"),
        }
    }

    fn report(&self, error: &InteractionError) {
        if matches!(error, InteractionError::Unauthenticated) {
            self.bus.publish(EngineEvent::AuthRequired);
        }
        self.notices
            .publish(NoticeLevel::Error, error.user_message());
    }
}
