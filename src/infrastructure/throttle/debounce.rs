use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::clock::Clock;

/// Collapses rapid trigger bursts to at most one pass per interval. Used for
/// visibility-regain refreshes, where focus/blur cycles can arrive several
/// times a second.
pub struct Debouncer {
    min_gap: Duration,
    clock: Arc<dyn Clock>,
    last: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(min_gap: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_gap,
            clock,
            last: Mutex::new(None),
        }
    }

    /// True when enough time has passed since the last allowed trigger.
    pub fn allow(&self) -> bool {
        let now = self.clock.now();
        let Ok(mut last) = self.last.lock() else {
            return false;
        };
        match *last {
            Some(prev) if now.duration_since(prev) < self.min_gap => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
