use async_trait::async_trait;

use crate::errors::Result;
use crate::notifications::notifications_model::EmailMessage;

/// Best-effort mail delivery. Implementations must not be relied on for
/// delivery guarantees; callers treat failures as log-only events.
#[async_trait]
pub trait NotifierTrait: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}
