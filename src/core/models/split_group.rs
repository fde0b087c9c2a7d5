use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitParticipant {
    pub user_id: Uuid,
    /// Display name snapshotted when the participant was resolved.
    pub name: String,
    pub amount_to_pay: Decimal,
}

/// A bill shared with other registered users. Pure metadata: creating or
/// completing a group never touches anyone's ledger or balance.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitGroup {
    pub id: Uuid,
    pub title: String,
    pub creator_id: Uuid,
    /// UPI handle participants pay the creator on.
    pub creator_upi: String,
    pub participants: Vec<SplitParticipant>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SplitGroup {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    /// Creator or participant; anyone else cannot see the group.
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id || self.has_participant(user_id)
    }
}
