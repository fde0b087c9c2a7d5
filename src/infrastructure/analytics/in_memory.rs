use crate::core::errors::LedgerError;
use crate::core::models::events::AnalyticsEvent;
use crate::infrastructure::analytics::Analytics;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryAnalytics {
    events: Arc<RwLock<Vec<AnalyticsEvent>>>,
}

impl InMemoryAnalytics {
    pub fn new() -> Self {
        InMemoryAnalytics::default()
    }

    pub async fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.read().await.clone()
    }

    pub async fn events_named(&self, event: &str) -> Vec<AnalyticsEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.event == event)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Analytics for InMemoryAnalytics {
    async fn track(
        &self,
        user_id: Uuid,
        event: &str,
        properties: serde_json::Value,
    ) -> Result<(), LedgerError> {
        let mut events = self.events.write().await;
        events.push(AnalyticsEvent {
            id: Uuid::new_v4(),
            user_id,
            event: event.to_string(),
            properties,
            created_at: chrono::Utc::now(),
        });
        Ok(())
    }
}
