//! Signed balance deltas. The stored `bank_balance` only ever moves by
//! adding one delta at a time; edits are expressed as a reversal followed
//! by a fresh creation, never as a precomputed net.

use rust_decimal::Decimal;

use crate::core::models::entry::EntryKind;
use crate::core::models::user::User;

/// Delta applied to the balance when an entry of `kind` comes into
/// existence: income raises the balance, expense lowers it.
pub fn creation_delta(kind: EntryKind, amount: Decimal) -> Decimal {
    match kind {
        EntryKind::Expense => -amount,
        EntryKind::Income => amount,
    }
}

/// Delta that undoes a previously applied entry.
pub fn reversal_delta(kind: EntryKind, amount: Decimal) -> Decimal {
    -creation_delta(kind, amount)
}

/// Applies one signed delta and returns the new balance. The balance is
/// allowed to go negative; overdraft is the user's business.
pub fn adjust(user: &mut User, delta: Decimal) -> Decimal {
    user.bank_balance += delta;
    user.bank_balance
}
