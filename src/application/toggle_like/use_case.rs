use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::session_gate::use_case::SessionGate;
use crate::domain::interaction::backend::InteractionBackend;
use crate::domain::interaction::errors::InteractionError;
use crate::domain::interaction::like::ToggleOutcome;
use crate::domain::interaction::stats::EntityRef;
use crate::domain::interaction::store::EntityStore;
use crate::infrastructure::shadow::traits::CounterShadow;

/// Optimistic like/unlike.
///
/// Ordering is fixed: gate, claim the per-(entity, user) slot, flip locally,
/// then fire the request. The server receipt always wins over the optimistic
/// flip, since it already includes concurrent likes by other users, and any
/// failure restores the pre-toggle snapshot.
pub struct ToggleLikeUseCase {
    store: Arc<EntityStore>,
    backend: Arc<dyn InteractionBackend>,
    shadow: Arc<dyn CounterShadow>,
    gate: Arc<SessionGate>,
}

impl ToggleLikeUseCase {
    pub fn new(
        store: Arc<EntityStore>,
        backend: Arc<dyn InteractionBackend>,
        shadow: Arc<dyn CounterShadow>,
        gate: Arc<SessionGate>,
    ) -> Self {
        Self {
            store,
            backend,
            shadow,
            gate,
        }
    }

    pub async fn execute(&self, entity: EntityRef) -> Result<ToggleOutcome, InteractionError> {
        let session = self.gate.require_session().await?;

        let Some(_slot) = self.store.begin_toggle(entity, session.user_id) else {
            debug!(entity = %entity, "toggle already in flight, coalescing");
            return Ok(ToggleOutcome::Coalesced(
                self.store.like_snapshot(entity).await,
            ));
        };

        let before = self.store.apply_optimistic_toggle(entity).await;
        match self.backend.toggle_like(entity, session.user_id).await {
            Ok(receipt) => {
                let snapshot = self.store.reconcile_like(entity, &receipt).await;
                if let Err(e) = self
                    .shadow
                    .store(&entity.shadow_key(), snapshot.likes_count)
                    .await
                {
                    warn!(entity = %entity, error = %e, "failed to persist counter shadow");
                }
                Ok(ToggleOutcome::Applied(snapshot))
            }
            Err(e) => {
                self.store.restore_like(entity, before).await;
                Err(e)
            }
        }
    }
}
