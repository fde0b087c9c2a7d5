use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A savings target. Money moves into a goal through contributions, which
/// also write a matching synthetic expense into the ledger.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Target amount.
    pub amount: Decimal,
    /// Sum of all contributions so far.
    pub saved: Decimal,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Re-derives the completion flag from the current totals. Called after
    /// every contribution and after target edits, so raising the target
    /// above the saved sum reopens the goal.
    pub fn recalculate_completed(&mut self) {
        self.completed = self.saved >= self.amount;
    }
}
