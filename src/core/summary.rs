//! Maintenance of the per-month rollups embedded in [`User`].
//!
//! Every ledger mutation funnels through [`apply_delta`] with a sign, so
//! create, delete and the two halves of an edit all share one code path.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::core::models::entry::EntryKind;
use crate::core::models::user::MonthlySummary;
use crate::core::models::LedgerEntry;

/// Direction of an aggregate update: `Add` when an entry comes into
/// existence, `Remove` when it is reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Add,
    Remove,
}

impl Sign {
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            Sign::Add => amount,
            Sign::Remove => -amount,
        }
    }
}

/// Month bucket key, `YYYY-MM`. Aggregation keys off entry creation time.
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// Applies one signed amount to the aggregate for `month`, creating the
/// month record if this is its first write.
///
/// Expense amounts also update the per-category map. A category driven
/// back to zero keeps its key, and months are never removed here even if
/// every total returns to zero.
pub fn apply_delta(
    summaries: &mut Vec<MonthlySummary>,
    month: &str,
    kind: EntryKind,
    category: &str,
    amount: Decimal,
    sign: Sign,
) {
    let idx = match summaries.iter().position(|s| s.month == month) {
        Some(idx) => idx,
        None => {
            summaries.push(MonthlySummary::new(month));
            summaries.len() - 1
        }
    };
    let summary = &mut summaries[idx];
    let delta = sign.apply(amount);

    match kind {
        EntryKind::Expense => {
            summary.total_expense += delta;
            *summary
                .categories
                .entry(category.to_string())
                .or_insert(Decimal::ZERO) += delta;
        }
        EntryKind::Income => {
            summary.total_income += delta;
        }
    }
}

/// Rebuilds the full set of monthly summaries from raw entries, months in
/// ascending order. Used by the integrity audit as an independent check of
/// the incrementally maintained state.
pub fn rebuild(entries: &[LedgerEntry]) -> Vec<MonthlySummary> {
    let mut summaries = Vec::new();
    for entry in entries {
        apply_delta(
            &mut summaries,
            &month_key(entry.created_at),
            entry.kind,
            &entry.category,
            entry.amount,
            Sign::Add,
        );
    }
    summaries.sort_by(|a, b| a.month.cmp(&b.month));
    summaries
}

/// True when the incrementally maintained summaries agree with a rebuilt
/// set. Retained empty months and zeroed category keys are not drift: a
/// month or category absent from one side counts as zero on that side.
pub fn agrees_with_rebuilt(stored: &[MonthlySummary], rebuilt: &[MonthlySummary]) -> bool {
    let months: BTreeSet<&str> = stored
        .iter()
        .chain(rebuilt)
        .map(|s| s.month.as_str())
        .collect();
    for month in months {
        let a = stored.iter().find(|s| s.month == month);
        let b = rebuilt.iter().find(|s| s.month == month);
        let totals = |s: Option<&MonthlySummary>| {
            s.map_or((Decimal::ZERO, Decimal::ZERO), |s| {
                (s.total_expense, s.total_income)
            })
        };
        if totals(a) != totals(b) {
            return false;
        }
        let categories: BTreeSet<&str> = a
            .into_iter()
            .chain(b)
            .flat_map(|s| s.categories.keys())
            .map(String::as_str)
            .collect();
        for category in categories {
            let amount = |s: Option<&MonthlySummary>| {
                s.and_then(|s| s.categories.get(category))
                    .copied()
                    .unwrap_or(Decimal::ZERO)
            };
            if amount(a) != amount(b) {
                return false;
            }
        }
    }
    true
}
