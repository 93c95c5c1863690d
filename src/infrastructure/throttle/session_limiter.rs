use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use super::clock::Clock;

/// Caps on background session re-checks. Many mounted views share one
/// limiter, so redundant polling cannot pile up against the auth service.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleLimits {
    pub max_per_window: u32,
    pub window: Duration,
    pub max_concurrent: u32,
}

impl Default for ThrottleLimits {
    fn default() -> Self {
        Self {
            max_per_window: 10,
            window: Duration::from_secs(60),
            max_concurrent: 2,
        }
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    recent: VecDeque<Instant>,
    in_flight: u32,
}

/// Rolling-window limiter for session checks.
///
/// Callers hold the returned [`CheckPermit`] for the duration of the check;
/// the concurrent slot is released when the permit drops. The window count is
/// consumed at acquisition and is not given back: a completed check still
/// counts against the rolling budget.
pub struct SessionCheckLimiter {
    limits: ThrottleLimits,
    clock: Arc<dyn Clock>,
    state: Mutex<LimiterState>,
}

pub struct CheckPermit {
    limiter: Arc<SessionCheckLimiter>,
}

impl Drop for CheckPermit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}

impl SessionCheckLimiter {
    pub fn new(limits: ThrottleLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            clock,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Claim a check slot, or `None` when either the rolling-window or the
    /// concurrency cap is exhausted.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CheckPermit> {
        let now = self.clock.now();
        let mut state = self.state.lock().ok()?;
        while let Some(&front) = state.recent.front() {
            if now.duration_since(front) >= self.limits.window {
                state.recent.pop_front();
            } else {
                break;
            }
        }
        if state.recent.len() as u32 >= self.limits.max_per_window {
            debug!(
                window_secs = self.limits.window.as_secs(),
                cap = self.limits.max_per_window,
                "session check suppressed: window budget exhausted"
            );
            return None;
        }
        if state.in_flight >= self.limits.max_concurrent {
            debug!(
                cap = self.limits.max_concurrent,
                "session check suppressed: concurrency cap reached"
            );
            return None;
        }
        state.recent.push_back(now);
        state.in_flight += 1;
        Some(CheckPermit {
            limiter: Arc::clone(self),
        })
    }

    fn release(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}
