use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::interaction::errors::InteractionError;
use crate::domain::session::entity::Session;
use crate::domain::session::provider::SessionProvider;
use crate::infrastructure::throttle::session_limiter::SessionCheckLimiter;

/// Cross-cutting auth gate.
///
/// Every mutating interaction calls [`SessionGate::require_session`] before
/// touching any local state, so a signed-out user never sees an optimistic
/// change flicker in and roll back. Re-validation against the auth service
/// sits behind a cached session and the shared check limiter; with the
/// budget exhausted and no valid cache, the caller is treated as signed out
/// rather than allowed to hammer the backend.
pub struct SessionGate {
    provider: Arc<dyn SessionProvider>,
    limiter: Arc<SessionCheckLimiter>,
    cached: RwLock<Option<Session>>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn SessionProvider>, limiter: Arc<SessionCheckLimiter>) -> Self {
        Self {
            provider,
            limiter,
            cached: RwLock::new(None),
        }
    }

    pub async fn require_session(&self) -> Result<Session, InteractionError> {
        if let Some(session) = self.cached.read().await.clone() {
            if session.is_valid_at(Utc::now()) {
                return Ok(session);
            }
        }
        let Some(_permit) = self.limiter.try_acquire() else {
            debug!("session re-check throttled, treating caller as signed out");
            return Err(InteractionError::Unauthenticated);
        };
        let fetched = self.provider.fetch_session().await?;
        let mut cached = self.cached.write().await;
        match fetched {
            Some(session) if session.is_valid_at(Utc::now()) => {
                *cached = Some(session.clone());
                Ok(session)
            }
            _ => {
                *cached = None;
                Err(InteractionError::Unauthenticated)
            }
        }
    }

    /// Push a session after an in-app login, or clear it on logout.
    pub async fn set_session(&self, session: Option<Session>) {
        *self.cached.write().await = session;
    }
}
