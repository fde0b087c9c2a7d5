//! Drift detection between the incrementally maintained balance and what
//! the ledger actually implies.
//!
//! Checks run after a commit has already succeeded, so a mismatch is
//! recorded and reported but never turned into a request failure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::models::user::MonthlySummary;
use crate::core::models::LedgerEntry;
use crate::core::summary;

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct DriftReport {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Operation under verification when the drift surfaced.
    pub operation: String,
    pub expected: Decimal,
    pub stored: Decimal,
    pub difference: Decimal,
    pub detected_at: DateTime<Utc>,
}

/// Result of replaying a user's full ledger against the stored balance
/// and monthly summaries.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct BalanceAudit {
    pub user_id: Uuid,
    pub stored_balance: Decimal,
    pub recomputed_balance: Decimal,
    /// Stored balance equals the replayed one.
    pub consistent: bool,
    /// Stored monthly summaries agree with a rebuild from raw entries.
    pub summaries_consistent: bool,
}

#[derive(Clone, Default)]
pub struct IntegrityChecker {
    reports: Arc<RwLock<Vec<DriftReport>>>,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        IntegrityChecker::default()
    }

    /// Post-commit verification: `previous + delta` must equal what storage
    /// now holds for the user. Returns the recorded report on mismatch.
    pub async fn check(
        &self,
        user_id: Uuid,
        operation: &str,
        previous: Decimal,
        delta: Decimal,
        stored: Decimal,
    ) -> Option<DriftReport> {
        let expected = previous + delta;
        if expected == stored {
            return None;
        }
        let report = self
            .record(user_id, operation.to_string(), expected, stored)
            .await;
        Some(report)
    }

    /// Replays every live entry as if from an empty ledger. Registration
    /// starts the balance at zero and every later movement is backed by an
    /// entry, so the replayed sum must match the stored balance exactly.
    pub fn recompute_balance(expenses: &[LedgerEntry], incomes: &[LedgerEntry]) -> Decimal {
        let spent: Decimal = expenses.iter().map(|e| e.amount).sum();
        let earned: Decimal = incomes.iter().map(|e| e.amount).sum();
        earned - spent
    }

    /// Full-ledger audit for one user: the balance is replayed entry by
    /// entry and the monthly summaries are rebuilt from scratch, both
    /// compared against stored state. A balance mismatch records a drift
    /// report; a summary mismatch is logged and reported in the result.
    pub async fn audit(
        &self,
        user_id: Uuid,
        stored: Decimal,
        stored_summaries: &[MonthlySummary],
        expenses: &[LedgerEntry],
        incomes: &[LedgerEntry],
    ) -> BalanceAudit {
        let recomputed = Self::recompute_balance(expenses, incomes);
        let consistent = recomputed == stored;
        if !consistent {
            self.record(user_id, "balance_audit".to_string(), recomputed, stored)
                .await;
        }

        let mut entries: Vec<LedgerEntry> = expenses.to_vec();
        entries.extend_from_slice(incomes);
        let rebuilt = summary::rebuild(&entries);
        let summaries_consistent = summary::agrees_with_rebuilt(stored_summaries, &rebuilt);
        if !summaries_consistent {
            error!(user_id = %user_id, "monthly summary drift detected");
        }

        BalanceAudit {
            user_id,
            stored_balance: stored,
            recomputed_balance: recomputed,
            consistent,
            summaries_consistent,
        }
    }

    pub async fn reports(&self) -> Vec<DriftReport> {
        self.reports.read().await.clone()
    }

    pub async fn reports_for(&self, user_id: Uuid) -> Vec<DriftReport> {
        self.reports
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn record(
        &self,
        user_id: Uuid,
        operation: String,
        expected: Decimal,
        stored: Decimal,
    ) -> DriftReport {
        let report = DriftReport {
            id: Uuid::new_v4(),
            user_id,
            operation,
            expected,
            stored,
            difference: stored - expected,
            detected_at: Utc::now(),
        };
        error!(
            user_id = %report.user_id,
            operation = %report.operation,
            expected = %report.expected,
            stored = %report.stored,
            difference = %report.difference,
            "balance drift detected"
        );
        self.reports.write().await.push(report.clone());
        report
    }
}
