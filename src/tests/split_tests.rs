use crate::core::errors::LedgerError;
use crate::core::services::{ParticipantSpec, ProfileUpdate, SplitGroupUpdate};
use crate::tests::{create_test_service, create_test_service_with_handles, dec, register_user};
use rust_decimal::Decimal;
use uuid::Uuid;

fn by_id(user_id: Uuid, amount: &str) -> ParticipantSpec {
    ParticipantSpec {
        user_id: Some(user_id),
        identifier: None,
        amount_to_pay: dec(amount),
    }
}

fn by_identifier(identifier: &str, amount: &str) -> ParticipantSpec {
    ParticipantSpec {
        user_id: None,
        identifier: Some(identifier.to_string()),
        amount_to_pay: dec(amount),
    }
}

#[tokio::test]
async fn test_create_split_resolves_every_identifier_kind() {
    let (service, _storage, notifier, _analytics) = create_test_service_with_handles();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;
    let (mira, _) = service
        .register(
            "Mira",
            "mira@example.com",
            "password123",
            Some("9876543210".to_string()),
        )
        .await
        .unwrap();
    let tara = register_user(&service, "Tara", "tara@example.com").await;
    service
        .update_profile(
            tara.id,
            ProfileUpdate {
                username: Some("tara_b".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let group = service
        .create_split_group(
            asha.id,
            "Goa trip",
            "asha@upi",
            vec![
                by_id(ravi.id, "500"),
                by_identifier("9876543210", "500"),
                by_identifier("TARA_B", "250"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(group.creator_id, asha.id);
    assert_eq!(group.creator_upi, "asha@upi");
    assert!(!group.is_completed);
    assert_eq!(group.participants.len(), 3);
    assert_eq!(group.participants[0].user_id, ravi.id);
    assert_eq!(group.participants[0].name, "Ravi");
    assert_eq!(group.participants[1].user_id, mira.id);
    assert_eq!(group.participants[2].user_id, tara.id);
    assert_eq!(group.participants[2].amount_to_pay, dec("250"));

    // Every participant got pinged, the creator did not.
    assert_eq!(notifier.sent_to(ravi.id).await.len(), 1);
    assert_eq!(notifier.sent_to(mira.id).await.len(), 1);
    assert_eq!(notifier.sent_to(tara.id).await.len(), 1);
    assert!(notifier.sent_to(asha.id).await.is_empty());
}

#[tokio::test]
async fn test_fanout_messages_carry_group_details() {
    let (service, _storage, notifier, _analytics) = create_test_service_with_handles();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;

    let group = service
        .create_split_group(asha.id, "Goa trip", "asha@upi", vec![by_id(ravi.id, "500")])
        .await
        .unwrap();
    service
        .edit_split_group(
            asha.id,
            group.id,
            SplitGroupUpdate {
                title: Some("Goa 2026".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    service.complete_split_group(asha.id, group.id).await.unwrap();

    let pings = notifier.sent_to(ravi.id).await;
    assert_eq!(pings.len(), 3);
    assert_eq!(pings[0].title, "New split");
    assert_eq!(pings[0].message, "Asha added you to \"Goa trip\"");
    assert_eq!(pings[1].title, "Split updated");
    assert_eq!(pings[1].message, "\"Goa 2026\" was updated");
    assert_eq!(pings[2].title, "Split completed");
    assert_eq!(pings[2].message, "\"Goa 2026\" was settled");
}

#[tokio::test]
async fn test_unresolved_participant_saves_nothing() {
    let (service, _storage, notifier, _analytics) = create_test_service_with_handles();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;

    let result = service
        .create_split_group(
            asha.id,
            "Dinner",
            "asha@upi",
            vec![
                by_id(ravi.id, "200"),
                by_identifier("ghost@example.com", "200"),
            ],
        )
        .await;
    assert!(matches!(result, Err(LedgerError::ParticipantNotFound(_))));

    assert!(service.my_created_groups(asha.id).await.unwrap().is_empty());
    assert!(notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_split_group_input_validation() {
    let service = create_test_service();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;

    let result = service
        .create_split_group(asha.id, "Dinner", "asha@upi", vec![])
        .await;
    assert!(matches!(
        result,
        Err(LedgerError::MissingField("participants"))
    ));

    let result = service
        .create_split_group(
            asha.id,
            "Dinner",
            "asha@upi",
            vec![ParticipantSpec {
                user_id: Some(ravi.id),
                identifier: None,
                amount_to_pay: dec("-10"),
            }],
        )
        .await;
    assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));

    let result = service
        .create_split_group(
            asha.id,
            "Dinner",
            "asha@upi",
            vec![ParticipantSpec {
                user_id: None,
                identifier: None,
                amount_to_pay: dec("10"),
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(LedgerError::MissingField("identifier"))
    ));
}

#[tokio::test]
async fn test_split_visibility_is_membership_scoped() {
    let service = create_test_service();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;
    let outsider = register_user(&service, "Outsider", "outsider@example.com").await;

    let group = service
        .create_split_group(asha.id, "Rent", "asha@upi", vec![by_id(ravi.id, "7500")])
        .await
        .unwrap();

    assert_eq!(service.split_group(asha.id, group.id).await.unwrap().id, group.id);
    assert_eq!(service.split_group(ravi.id, group.id).await.unwrap().id, group.id);
    let result = service.split_group(outsider.id, group.id).await;
    assert!(matches!(result, Err(LedgerError::GroupNotFound(_))));

    // Creator side and participant side listings.
    let created = service.my_created_groups(asha.id).await.unwrap();
    assert_eq!(created.len(), 1);
    assert!(service.my_participating_groups(asha.id).await.unwrap().is_empty());

    let participating = service.my_participating_groups(ravi.id).await.unwrap();
    assert_eq!(participating.len(), 1);
    assert!(service.my_created_groups(ravi.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_split_group_is_creator_only() {
    let service = create_test_service();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;
    let mira = register_user(&service, "Mira", "mira@example.com").await;

    let group = service
        .create_split_group(asha.id, "Rent", "asha@upi", vec![by_id(ravi.id, "7500")])
        .await
        .unwrap();

    let result = service
        .edit_split_group(
            ravi.id,
            group.id,
            SplitGroupUpdate {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(LedgerError::NotGroupCreator(_))));

    // A participant list replaces the old one wholesale.
    let edited = service
        .edit_split_group(
            asha.id,
            group.id,
            SplitGroupUpdate {
                title: Some("Rent June".to_string()),
                creator_upi: None,
                participants: Some(vec![by_id(mira.id, "3750")]),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.title, "Rent June");
    assert_eq!(edited.participants.len(), 1);
    assert_eq!(edited.participants[0].user_id, mira.id);

    assert!(service.my_participating_groups(ravi.id).await.unwrap().is_empty());
    assert_eq!(service.my_participating_groups(mira.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_complete_split_group_is_idempotent() {
    let (service, _storage, notifier, _analytics) = create_test_service_with_handles();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;

    let group = service
        .create_split_group(asha.id, "Rent", "asha@upi", vec![by_id(ravi.id, "7500")])
        .await
        .unwrap();

    let result = service.complete_split_group(ravi.id, group.id).await;
    assert!(matches!(result, Err(LedgerError::NotGroupCreator(_))));

    let first = service.complete_split_group(asha.id, group.id).await.unwrap();
    assert!(first.group.is_completed);
    assert!(!first.already_completed);

    let second = service.complete_split_group(asha.id, group.id).await.unwrap();
    assert!(second.group.is_completed);
    assert!(second.already_completed);

    // One creation ping plus one completion ping, nothing doubled.
    assert_eq!(notifier.sent_to(ravi.id).await.len(), 2);
}

#[tokio::test]
async fn test_split_groups_never_touch_balances() {
    let service = create_test_service();
    let asha = register_user(&service, "Asha", "asha@example.com").await;
    let ravi = register_user(&service, "Ravi", "ravi@example.com").await;

    let group = service
        .create_split_group(asha.id, "Rent", "asha@upi", vec![by_id(ravi.id, "7500")])
        .await
        .unwrap();
    service.complete_split_group(asha.id, group.id).await.unwrap();

    assert_eq!(
        service.get_profile(asha.id).await.unwrap().bank_balance,
        Decimal::ZERO
    );
    assert_eq!(
        service.get_profile(ravi.id).await.unwrap().bank_balance,
        Decimal::ZERO
    );
    assert!(service.full_activity(asha.id).await.unwrap().is_empty());
    assert!(service.full_activity(ravi.id).await.unwrap().is_empty());
}
