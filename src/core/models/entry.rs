use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{DEFAULT_EXPENSE_CATEGORY, INCOME_CATEGORY};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Expense,
    Income,
}

impl EntryKind {
    pub fn default_category(&self) -> &'static str {
        match self {
            EntryKind::Expense => DEFAULT_EXPENSE_CATEGORY,
            EntryKind::Income => INCOME_CATEGORY,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryKind::Expense => "expense",
            EntryKind::Income => "income",
        };
        write!(f, "{}", s)
    }
}

/// A single expense or income record. Amounts are always positive; the
/// kind decides which direction the balance moves.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EntryKind,
    pub title: String,
    pub amount: Decimal,
    pub category: String,
    /// Display date chosen by the caller. Monthly aggregation buckets by
    /// `created_at`, never by this field.
    pub date: DateTime<Utc>,
    /// Present on the synthetic expenses written by goal contributions.
    pub goal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
