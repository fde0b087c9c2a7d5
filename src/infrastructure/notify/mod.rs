pub mod in_memory;

use crate::core::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Outbound user notifications. The service fires these after the ledger
/// work has committed and swallows any failure; delivery troubles must
/// never fail a request that already succeeded.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, title: &str, message: &str)
        -> Result<(), LedgerError>;
}
