use async_trait::async_trait;

use super::entity::Session;
use crate::domain::interaction::errors::InteractionError;

/// Port to the auth service's session endpoint. `Ok(None)` means signed out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn fetch_session(&self) -> Result<Option<Session>, InteractionError>;
}
