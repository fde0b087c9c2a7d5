use crate::core::models::entry::{EntryKind, LedgerEntry};
use crate::core::services::EntryUpdate;
use crate::core::summary::{self, Sign};
use crate::tests::{create_test_service, dec, entry_input, register_user};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

fn sample_entry(
    kind: EntryKind,
    amount: &str,
    category: &str,
    created_at: DateTime<Utc>,
) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        kind,
        title: "Sample".to_string(),
        amount: dec(amount),
        category: category.to_string(),
        date: created_at,
        goal_id: None,
        created_at,
        updated_at: created_at,
    }
}

#[test]
fn test_month_key_format() {
    let at = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
    assert_eq!(summary::month_key(at), "2026-03");
}

#[test]
fn test_apply_delta_creates_month_lazily() {
    let mut summaries = Vec::new();
    summary::apply_delta(&mut summaries, "2026-01", EntryKind::Expense, "Food", dec("100"), Sign::Add);
    summary::apply_delta(&mut summaries, "2026-01", EntryKind::Income, "Income", dec("300"), Sign::Add);
    summary::apply_delta(&mut summaries, "2026-02", EntryKind::Expense, "Food", dec("40"), Sign::Add);

    assert_eq!(summaries.len(), 2);
    let jan = summaries.iter().find(|s| s.month == "2026-01").unwrap();
    assert_eq!(jan.total_expense, dec("100"));
    assert_eq!(jan.total_income, dec("300"));
    assert_eq!(jan.categories["Food"], dec("100"));
    // Income stays out of the category map.
    assert_eq!(jan.categories.len(), 1);
}

#[test]
fn test_apply_delta_keeps_zeroed_categories_and_months() {
    let mut summaries = Vec::new();
    summary::apply_delta(&mut summaries, "2026-01", EntryKind::Expense, "Food", dec("100"), Sign::Add);
    summary::apply_delta(&mut summaries, "2026-01", EntryKind::Expense, "Food", dec("100"), Sign::Remove);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_expense, Decimal::ZERO);
    assert_eq!(summaries[0].categories["Food"], Decimal::ZERO);
}

#[test]
fn test_rebuild_orders_months_ascending() {
    let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let jan = Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap();
    let entries = vec![
        sample_entry(EntryKind::Expense, "50", "Food", feb),
        sample_entry(EntryKind::Income, "500", "Income", jan),
        sample_entry(EntryKind::Expense, "30", "Travel", jan),
    ];

    let summaries = summary::rebuild(&entries);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].month, "2026-01");
    assert_eq!(summaries[0].total_income, dec("500"));
    assert_eq!(summaries[0].total_expense, dec("30"));
    assert_eq!(summaries[1].month, "2026-02");
    assert_eq!(summaries[1].total_expense, dec("50"));
}

#[test]
fn test_rebuild_agreement_tolerates_retained_zeros() {
    let mut stored = Vec::new();
    summary::apply_delta(&mut stored, "2026-01", EntryKind::Expense, "Food", dec("100"), Sign::Add);
    summary::apply_delta(&mut stored, "2026-01", EntryKind::Expense, "Food", dec("100"), Sign::Remove);
    summary::apply_delta(&mut stored, "2026-02", EntryKind::Expense, "Travel", dec("40"), Sign::Add);

    // The replay of surviving entries has no trace of the emptied month or
    // the zeroed category key; that is retention, not drift.
    let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let rebuilt = summary::rebuild(&[sample_entry(EntryKind::Expense, "40", "Travel", feb)]);
    assert!(summary::agrees_with_rebuilt(&stored, &rebuilt));

    // A real total mismatch is drift.
    stored[1].total_expense += dec("1");
    assert!(!summary::agrees_with_rebuilt(&stored, &rebuilt));
}

#[tokio::test]
async fn test_current_summary_accumulates_by_category() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    service
        .add_entry(user.id, EntryKind::Income, entry_input("Salary", "5000", None))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Lunch", "200", Some("Food")))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Dinner", "300", Some("Food")))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Bus", "50", Some("Travel")))
        .await
        .unwrap();

    let summary = service.current_summary(user.id).await.unwrap();
    assert_eq!(summary.total_income, dec("5000"));
    assert_eq!(summary.total_expense, dec("550"));
    assert_eq!(summary.saving, dec("4450"));
    assert_eq!(summary.categories["Food"], dec("500"));
    assert_eq!(summary.categories["Travel"], dec("50"));
}

#[tokio::test]
async fn test_current_summary_for_untouched_month_is_zero() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    let summary = service.current_summary(user.id).await.unwrap();
    assert_eq!(summary.total_expense, Decimal::ZERO);
    assert_eq!(summary.total_income, Decimal::ZERO);
    assert_eq!(summary.saving, Decimal::ZERO);
    assert!(summary.categories.is_empty());
}

#[tokio::test]
async fn test_category_moved_by_edit_keeps_old_key_at_zero() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;
    let entry = service
        .add_entry(user.id, EntryKind::Expense, entry_input("Cab", "150", Some("Food")))
        .await
        .unwrap();

    service
        .edit_entry(
            user.id,
            EntryKind::Expense,
            entry.id,
            EntryUpdate {
                title: "Cab".to_string(),
                amount: dec("150"),
                category: Some("Travel".to_string()),
            },
        )
        .await
        .unwrap();

    let summary = service.current_summary(user.id).await.unwrap();
    assert_eq!(summary.categories["Food"], Decimal::ZERO);
    assert_eq!(summary.categories["Travel"], dec("150"));
    assert_eq!(summary.total_expense, dec("150"));
}

#[tokio::test]
async fn test_month_survives_deleting_its_only_entry() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;
    let entry = service
        .add_entry(user.id, EntryKind::Expense, entry_input("Lunch", "200", None))
        .await
        .unwrap();

    service
        .delete_entry(user.id, EntryKind::Expense, entry.id)
        .await
        .unwrap();

    let ledger = service.monthly_ledger(user.id).await.unwrap();
    assert_eq!(ledger.monthly_summaries.len(), 1);
    assert_eq!(ledger.monthly_summaries[0].total_expense, Decimal::ZERO);
    assert_eq!(ledger.bank_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_category_totals_fold_every_month() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Lunch", "200", Some("Food")))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Dinner", "100", Some("Food")))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Bus", "50", Some("Travel")))
        .await
        .unwrap();

    let totals = service.category_totals(user.id).await.unwrap();
    assert_eq!(totals["Food"], dec("300"));
    assert_eq!(totals["Travel"], dec("50"));
    assert_eq!(totals.len(), 2);
}

#[tokio::test]
async fn test_trends_pick_heaviest_category() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    service
        .add_entry(user.id, EntryKind::Income, entry_input("Salary", "1000", None))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Lunch", "100", Some("Food")))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Train", "100", Some("Travel")))
        .await
        .unwrap();
    service
        .add_entry(user.id, EntryKind::Expense, entry_input("Pen", "10", Some("Stationery")))
        .await
        .unwrap();

    let trends = service.monthly_trends(user.id).await.unwrap();
    assert_eq!(trends.len(), 1);
    // Food and Travel tie at 100; the lexicographically first wins.
    assert_eq!(trends[0].top_category, "Food");
    assert_eq!(trends[0].top_category_amount, dec("100"));
    assert_eq!(trends[0].total_expense, dec("210"));
    assert_eq!(trends[0].total_income, dec("1000"));
}

#[tokio::test]
async fn test_trends_report_none_without_expenses() {
    let service = create_test_service();
    let user = register_user(&service, "Asha", "asha@example.com").await;

    service
        .add_entry(user.id, EntryKind::Income, entry_input("Salary", "1000", None))
        .await
        .unwrap();

    let trends = service.monthly_trends(user.id).await.unwrap();
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].top_category, "None");
    assert_eq!(trends[0].top_category_amount, Decimal::ZERO);
}
