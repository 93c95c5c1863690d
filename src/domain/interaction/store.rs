use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::backend::{CommentRecord, LikeAction, ToggleReceipt};
use super::comment::{Comment, CommentSync};
use super::like::LikeSnapshot;
use super::stats::{EntityRef, InteractionStats};

/// Transient local state for one mounted entity.
///
/// Displayed values are either the last server-confirmed value or a local
/// adjustment of exactly one pending confirmation; `confirmed` records which
/// of the two it currently is, so shadow hydration never clobbers server
/// truth.
#[derive(Debug, Clone, Default)]
struct EntityState {
    stats: InteractionStats,
    has_liked: bool,
    comments: Vec<Comment>,
    refresh_generation: u64,
    confirmed: bool,
}

/// Shared optimistic state for every entity the embedder has touched.
///
/// All mutation paths clamp counters at zero and go through one of three
/// verbs: optimistic apply, reconcile (server truth wins), or restore
/// (rollback to a pre-mutation snapshot).
pub struct EntityStore {
    entities: RwLock<HashMap<EntityRef, EntityState>>,
    // Guarded by a plain mutex: never held across an await, and the RAII
    // guard must be able to release from a non-async Drop.
    in_flight_toggles: StdMutex<HashSet<(EntityRef, Uuid)>>,
}

/// Releases the (entity, user) toggle slot when dropped, panic or not.
pub struct ToggleGuard {
    store: Arc<EntityStore>,
    key: (EntityRef, Uuid),
}

impl Drop for ToggleGuard {
    fn drop(&mut self) {
        if let Ok(mut slots) = self.store.in_flight_toggles.lock() {
            slots.remove(&self.key);
        }
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            in_flight_toggles: StdMutex::new(HashSet::new()),
        }
    }

    /// Claim the single toggle slot for this (entity, user) pair. Returns
    /// `None` while another toggle holds it, in which case the caller must
    /// not fire a second request.
    pub fn begin_toggle(self: &Arc<Self>, entity: EntityRef, user_id: Uuid) -> Option<ToggleGuard> {
        let key = (entity, user_id);
        let mut slots = self.in_flight_toggles.lock().ok()?;
        if !slots.insert(key) {
            return None;
        }
        Some(ToggleGuard {
            store: Arc::clone(self),
            key,
        })
    }

    pub async fn like_snapshot(&self, entity: EntityRef) -> LikeSnapshot {
        let entities = self.entities.read().await;
        let state = entities.get(&entity).cloned().unwrap_or_default();
        LikeSnapshot {
            has_liked: state.has_liked,
            likes_count: state.stats.likes_count,
        }
    }

    pub async fn stats(&self, entity: EntityRef) -> InteractionStats {
        let entities = self.entities.read().await;
        entities
            .get(&entity)
            .map(|state| state.stats)
            .unwrap_or_default()
    }

    pub async fn comments(&self, entity: EntityRef) -> Vec<Comment> {
        let entities = self.entities.read().await;
        entities
            .get(&entity)
            .map(|state| state.comments.clone())
            .unwrap_or_default()
    }

    /// Pre-seed the like counter from the persisted shadow. A no-op once any
    /// server-confirmed value has landed; the shadow is advisory only.
    pub async fn seed_likes(&self, entity: EntityRef, likes_count: u64) {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        if !state.confirmed {
            state.stats.likes_count = likes_count;
        }
    }

    /// Flip the like state locally, assuming success. Returns the pre-flip
    /// snapshot so the caller can restore it on failure.
    pub async fn apply_optimistic_toggle(&self, entity: EntityRef) -> LikeSnapshot {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        let before = LikeSnapshot {
            has_liked: state.has_liked,
            likes_count: state.stats.likes_count,
        };
        state.has_liked = !state.has_liked;
        state.stats.likes_count = if state.has_liked {
            state.stats.likes_count + 1
        } else {
            state.stats.likes_count.saturating_sub(1)
        };
        before
    }

    /// Overwrite local like state with the server receipt. A receipt is
    /// newer truth than any refresh already in flight, so those become
    /// stale here.
    pub async fn reconcile_like(&self, entity: EntityRef, receipt: &ToggleReceipt) -> LikeSnapshot {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        state.has_liked = receipt.action == LikeAction::Liked;
        state.stats.likes_count = receipt.count;
        state.confirmed = true;
        state.refresh_generation += 1;
        LikeSnapshot {
            has_liked: state.has_liked,
            likes_count: state.stats.likes_count,
        }
    }

    pub async fn restore_like(&self, entity: EntityRef, snapshot: LikeSnapshot) {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        state.has_liked = snapshot.has_liked;
        state.stats.likes_count = snapshot.likes_count;
    }

    /// Insert an optimistic comment at the head of the list and bump the
    /// counter.
    pub async fn insert_comment(&self, comment: Comment) {
        let mut entities = self.entities.write().await;
        let state = entities.entry(comment.entity).or_default();
        state.comments.insert(0, comment);
        state.stats.comments_count += 1;
    }

    pub async fn comment(&self, entity: EntityRef, comment_id: Uuid) -> Option<Comment> {
        let entities = self.entities.read().await;
        entities
            .get(&entity)?
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned()
    }

    /// Replace a temporary record with its server-confirmed form, keeping its
    /// position in the list. Returns the updated comment, or `None` when the
    /// record was discarded while the request was in flight.
    pub async fn confirm_comment(
        &self,
        entity: EntityRef,
        temp_id: Uuid,
        record: &CommentRecord,
    ) -> Option<Comment> {
        let mut entities = self.entities.write().await;
        let state = entities.get_mut(&entity)?;
        let slot = state.comments.iter_mut().find(|c| c.id == temp_id)?;
        slot.id = record.id;
        slot.text = record.text.clone();
        slot.created_at = record.created_at;
        slot.sync = CommentSync::Confirmed;
        Some(slot.clone())
    }

    pub async fn set_comment_sync(
        &self,
        entity: EntityRef,
        comment_id: Uuid,
        sync: CommentSync,
    ) -> Option<Comment> {
        let mut entities = self.entities.write().await;
        let state = entities.get_mut(&entity)?;
        let slot = state.comments.iter_mut().find(|c| c.id == comment_id)?;
        slot.sync = sync;
        Some(slot.clone())
    }

    /// Remove a comment and take back its optimistic counter increment.
    pub async fn remove_comment(&self, entity: EntityRef, comment_id: Uuid) -> bool {
        let mut entities = self.entities.write().await;
        let Some(state) = entities.get_mut(&entity) else {
            return false;
        };
        let before = state.comments.len();
        state.comments.retain(|c| c.id != comment_id);
        if state.comments.len() == before {
            return false;
        }
        state.stats.comments_count = state.stats.comments_count.saturating_sub(1);
        true
    }

    /// Merge a fetched comment page under any locally pending records.
    /// Optimistic and pending-sync comments stay at the head; confirmed
    /// records are replaced wholesale by the fetched page.
    pub async fn merge_comment_page(
        &self,
        entity: EntityRef,
        records: &[CommentRecord],
    ) -> Vec<Comment> {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        let mut merged: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.is_optimistic())
            .cloned()
            .collect();
        merged.extend(records.iter().map(|record| Comment {
            id: record.id,
            entity,
            author_id: record.author_id,
            text: record.text.clone(),
            created_at: record.created_at,
            sync: CommentSync::Confirmed,
        }));
        state.comments = merged.clone();
        merged
    }

    /// Start a stats refresh and return its generation token. A refresh may
    /// only commit while its token is still the latest, so a slow response
    /// can never overwrite the result of a newer one.
    pub async fn begin_refresh(&self, entity: EntityRef) -> u64 {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        state.refresh_generation += 1;
        state.refresh_generation
    }

    /// Apply refreshed stats if `generation` is still current. Returns
    /// whether the commit happened.
    pub async fn commit_refresh(
        &self,
        entity: EntityRef,
        generation: u64,
        stats: InteractionStats,
    ) -> bool {
        let mut entities = self.entities.write().await;
        let state = entities.entry(entity).or_default();
        if state.refresh_generation != generation {
            return false;
        }
        state.stats = stats;
        state.confirmed = true;
        true
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
