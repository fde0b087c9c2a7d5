pub mod in_memory;

use crate::core::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Product analytics sink. Fire-and-forget like [`Notifier`]: a sink that
/// errors gets a warning in the logs and nothing else.
///
/// [`Notifier`]: crate::infrastructure::notify::Notifier
#[async_trait]
pub trait Analytics: Send + Sync {
    async fn track(
        &self,
        user_id: Uuid,
        event: &str,
        properties: serde_json::Value,
    ) -> Result<(), LedgerError>;
}
