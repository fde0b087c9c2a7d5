use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user-facing notification handed to the delivery channel.
#[derive(Clone, Debug, Serialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A product analytics event. Delivery is fire-and-forget; failures are
/// logged and never surfaced to the caller.
#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event: String,
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
