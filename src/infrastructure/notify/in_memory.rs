use crate::core::errors::LedgerError;
use crate::core::models::events::NotificationRecord;
use crate::infrastructure::notify::Notifier;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    sent: Arc<RwLock<Vec<NotificationRecord>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        InMemoryNotifier::default()
    }

    pub async fn sent(&self) -> Vec<NotificationRecord> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, user_id: Uuid) -> Vec<NotificationRecord> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
    ) -> Result<(), LedgerError> {
        let mut sent = self.sent.write().await;
        sent.push(NotificationRecord {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            created_at: chrono::Utc::now(),
        });
        Ok(())
    }
}
