use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::interaction::backend::InteractionBackend;
use crate::domain::interaction::errors::InteractionError;
use crate::domain::interaction::stats::{EntityRef, InteractionStats};
use crate::domain::interaction::store::EntityStore;
use crate::infrastructure::shadow::traits::CounterShadow;
use crate::infrastructure::throttle::debounce::Debouncer;

/// The single resync point with server truth.
///
/// Runs after every mutating action and on visibility regain, and overwrites
/// local counters unconditionally: any optimistic drift, including changes
/// made by other users in the background, ends here. A generation token taken
/// before the fetch keeps a slow response from clobbering a newer one.
pub struct RefreshStatsUseCase {
    store: Arc<EntityStore>,
    backend: Arc<dyn InteractionBackend>,
    shadow: Arc<dyn CounterShadow>,
    visibility: Debouncer,
}

impl RefreshStatsUseCase {
    pub fn new(
        store: Arc<EntityStore>,
        backend: Arc<dyn InteractionBackend>,
        shadow: Arc<dyn CounterShadow>,
        visibility: Debouncer,
    ) -> Self {
        Self {
            store,
            backend,
            shadow,
            visibility,
        }
    }

    pub async fn execute(&self, entity: EntityRef) -> Result<InteractionStats, InteractionError> {
        let generation = self.store.begin_refresh(entity).await;
        let document = self.backend.fetch_entity(entity).await?;
        let stats = document.stats.normalize()?;
        if self.store.commit_refresh(entity, generation, stats).await {
            if let Err(e) = self
                .shadow
                .store(&entity.shadow_key(), stats.likes_count)
                .await
            {
                warn!(entity = %entity, error = %e, "failed to persist counter shadow");
            }
        } else {
            debug!(entity = %entity, "stale stats refresh discarded");
        }
        Ok(self.store.stats(entity).await)
    }

    /// Debounced entry point for tab-refocus refreshes. `Ok(None)` means the
    /// trigger was collapsed into a recent refresh.
    pub async fn on_visibility_regained(
        &self,
        entity: EntityRef,
    ) -> Result<Option<InteractionStats>, InteractionError> {
        if !self.visibility.allow() {
            debug!(entity = %entity, "visibility refresh debounced");
            return Ok(None);
        }
        self.execute(entity).await.map(Some)
    }
}
