use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use super::events::{EngineEvent, EventBus, Notice, NoticeLevel};
use crate::infrastructure::throttle::clock::Clock;

/// Upper bound on tracked notices; prevents unbounded growth if an embedder
/// produces many distinct messages inside one window.
const MAX_TRACKED: usize = 64;

/// Deduplicating publisher for user-facing notices.
///
/// An error that fires once per mounted component would otherwise stack the
/// same toast several times; identical notices inside the window collapse to
/// one published event.
pub struct NoticeCenter {
    bus: EventBus,
    clock: Arc<dyn Clock>,
    window: Duration,
    recent: Mutex<HashMap<Notice, Instant>>,
}

impl NoticeCenter {
    pub fn new(bus: EventBus, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            bus,
            clock,
            window,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Publish a notice unless an identical one went out inside the window.
    /// Returns whether the notice was actually published.
    pub fn publish(&self, level: NoticeLevel, message: impl Into<String>) -> bool {
        let notice = Notice {
            level,
            message: message.into(),
        };
        let now = self.clock.now();
        let Ok(mut recent) = self.recent.lock() else {
            return false;
        };
        recent.retain(|_, seen| now.duration_since(*seen) < self.window);
        if recent.contains_key(&notice) {
            debug!(message = %notice.message, "duplicate notice suppressed");
            return false;
        }
        if recent.len() >= MAX_TRACKED {
            if let Some(oldest) = recent
                .iter()
                .min_by_key(|(_, seen)| **seen)
                .map(|(n, _)| n.clone())
            {
                recent.remove(&oldest);
            }
        }
        recent.insert(notice.clone(), now);
        drop(recent);
        self.bus.publish(EngineEvent::Notice(notice));
        true
    }
}
