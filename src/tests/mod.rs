mod split_tests;
mod summary_tests;
mod user_tests;

use crate::auth::jwt::JwtService;
use crate::core::models::user::User;
use crate::core::services::{LedgerService, NewEntry};
use crate::infrastructure::analytics::in_memory::InMemoryAnalytics;
use crate::infrastructure::notify::in_memory::InMemoryNotifier;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use rust_decimal::Decimal;
use std::str::FromStr;

pub type TestService = LedgerService<InMemoryStorage, InMemoryNotifier, InMemoryAnalytics>;

pub fn create_test_service() -> TestService {
    let storage = InMemoryStorage::new();
    let notifier = InMemoryNotifier::new();
    let analytics = InMemoryAnalytics::new();
    LedgerService::new(storage, notifier, analytics, test_jwt())
}

/// Same wiring as [`create_test_service`], but hands back clones of the
/// in-memory infrastructure so tests can inspect or corrupt what was
/// stored, sent and tracked.
pub fn create_test_service_with_handles()
-> (TestService, InMemoryStorage, InMemoryNotifier, InMemoryAnalytics) {
    let storage = InMemoryStorage::new();
    let notifier = InMemoryNotifier::new();
    let analytics = InMemoryAnalytics::new();
    let service = LedgerService::new(
        storage.clone(),
        notifier.clone(),
        analytics.clone(),
        test_jwt(),
    );
    (service, storage, notifier, analytics)
}

pub fn test_jwt() -> JwtService {
    JwtService::new("test-secret".to_string(), 24)
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub async fn register_user(service: &TestService, name: &str, email: &str) -> User {
    let (user, _token) = service
        .register(name, email, "password123", None)
        .await
        .unwrap();
    user
}

pub fn entry_input(title: &str, amount: &str, category: Option<&str>) -> NewEntry {
    NewEntry {
        title: title.to_string(),
        amount: dec(amount),
        category: category.map(str::to_string),
        date: None,
    }
}
