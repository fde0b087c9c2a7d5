use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-month rollup of a user's ledger. One record per calendar month,
/// created lazily on first write and never deleted afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlySummary {
    /// Month key in `YYYY-MM` form, derived from entry creation time.
    pub month: String,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    /// Expense totals keyed by category. Income totals never land here.
    /// A category that returns to zero stays in the map.
    pub categories: BTreeMap<String, Decimal>,
}

impl MonthlySummary {
    pub fn new(month: impl Into<String>) -> Self {
        MonthlySummary {
            month: month.into(),
            total_expense: Decimal::ZERO,
            total_income: Decimal::ZERO,
            categories: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bank_balance: Decimal,
    pub monthly_income: Decimal,
    pub coins: i64,
    pub monthly_summaries: Vec<MonthlySummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary_for(&self, month: &str) -> Option<&MonthlySummary> {
        self.monthly_summaries.iter().find(|s| s.month == month)
    }

    /// Matches the lookup identifiers accepted by split-group creation:
    /// email, phone number or username.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let normalized = identifier.trim().to_lowercase();
        if self.email.to_lowercase() == normalized {
            return true;
        }
        if self
            .phone
            .as_deref()
            .is_some_and(|p| p == identifier.trim())
        {
            return true;
        }
        self.username
            .as_deref()
            .is_some_and(|u| u.to_lowercase() == normalized)
    }
}
