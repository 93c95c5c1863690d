use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::interaction::like::LikeSnapshot;
use crate::domain::interaction::stats::{EntityRef, InteractionStats};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient user-facing notification (a toast, in most embedders).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Events published by the engine.
///
/// Embedders subscribe here instead of patching shared globals: the
/// auth-required signal stands where intercepted fetch calls used to, and
/// notices stand where direct toast calls used to.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A mutating call was attempted without a valid session; route the user
    /// to the login prompt.
    AuthRequired,
    LikeReconciled {
        entity: EntityRef,
        snapshot: LikeSnapshot,
    },
    StatsReconciled {
        entity: EntityRef,
        stats: InteractionStats,
    },
    CommentConfirmed {
        entity: EntityRef,
        comment_id: Uuid,
    },
    CommentPendingSync {
        entity: EntityRef,
        comment_id: Uuid,
    },
    Notice(Notice),
}

/// Broadcast fan-out to every mounted view.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// A publish with no live subscribers is not an error.
    pub fn publish(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
