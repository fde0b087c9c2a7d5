use crate::core::errors::LedgerError;
use crate::core::services::ProfileUpdate;
use crate::tests::{create_test_service, dec, register_user, test_jwt};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn test_register_starts_with_empty_ledger() {
    let service = create_test_service();
    let (user, token) = service
        .register("Asha", "Asha@Example.com", "password123", None)
        .await
        .unwrap();

    assert_eq!(user.email, "asha@example.com");
    assert_eq!(user.bank_balance, Decimal::ZERO);
    assert!(user.monthly_summaries.is_empty());
    assert!(!token.is_empty());
    assert_ne!(user.password_hash, "password123");

    let resolved = service.resolve_bearer(&token).await.unwrap();
    assert_eq!(resolved, user.id);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let service = create_test_service();
    register_user(&service, "Asha", "asha@example.com").await;

    let result = service
        .register("Imposter", "asha@example.com", "password123", None)
        .await;
    assert!(matches!(result, Err(LedgerError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn test_register_validates_inputs() {
    let service = create_test_service();

    let result = service.register("Asha", "not-an-email", "pw", None).await;
    assert!(matches!(result, Err(LedgerError::InvalidEmail(_))));

    let result = service.register("Asha", "asha@example.com", "", None).await;
    assert!(matches!(result, Err(LedgerError::MissingField("password"))));

    let result = service
        .register("Asha", "asha@example.com", "pw", Some("123".to_string()))
        .await;
    assert!(matches!(result, Err(LedgerError::InvalidPhone)));
}

#[tokio::test]
async fn test_login_checks_credentials() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    let (logged_in, token) = service
        .login("asha@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);
    assert_eq!(service.resolve_bearer(&token).await.unwrap(), user.id);

    let result = service.login("asha@example.com", "wrong").await;
    assert!(matches!(result, Err(LedgerError::InvalidCredentials)));

    let result = service.login("nobody@example.com", "password123").await;
    assert!(matches!(result, Err(LedgerError::InvalidCredentials)));
}

#[tokio::test]
async fn test_resolve_bearer_rejects_bad_tokens() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    let result = service.resolve_bearer("not-a-token").await;
    assert!(matches!(result, Err(LedgerError::Unauthorized(_))));

    // Well-formed token signed with the wrong secret.
    let foreign = crate::auth::jwt::JwtService::new("other-secret".to_string(), 24)
        .generate_token(user.id)
        .unwrap();
    let result = service.resolve_bearer(&foreign).await;
    assert!(matches!(result, Err(LedgerError::Unauthorized(_))));

    // Valid signature but no such user.
    let orphan = test_jwt().generate_token(Uuid::new_v4()).unwrap();
    let result = service.resolve_bearer(&orphan).await;
    assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
}

#[tokio::test]
async fn test_update_profile_fields() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    let updated = service
        .update_profile(
            user.id,
            ProfileUpdate {
                name: Some("Asha K".to_string()),
                username: Some("asha_k".to_string()),
                phone: Some("9876543210".to_string()),
                avatar_url: Some("https://cdn.example.com/asha.png".to_string()),
                monthly_income: Some(dec("45000")),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Asha K");
    assert_eq!(updated.username.as_deref(), Some("asha_k"));
    assert_eq!(updated.phone.as_deref(), Some("9876543210"));
    assert_eq!(updated.monthly_income, dec("45000"));
    // Untouched fields survive a partial update.
    assert_eq!(updated.email, "asha@example.com");
    assert_eq!(updated.bank_balance, Decimal::ZERO);

    let result = service
        .update_profile(
            user.id,
            ProfileUpdate {
                monthly_income: Some(dec("-1")),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));

    let result = service
        .update_profile(
            user.id,
            ProfileUpdate {
                phone: Some("123".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(LedgerError::InvalidPhone)));
}

#[tokio::test]
async fn test_profile_requires_existing_user() {
    let service = create_test_service();
    let result = service.get_profile(Uuid::new_v4()).await;
    assert!(matches!(result, Err(LedgerError::UserNotFound(_))));
}
