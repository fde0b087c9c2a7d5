use crate::auth::jwt::JwtService;
use crate::constants::{
    BALANCE_DRIFT_DETECTED, ENTRY_DELETED, ENTRY_EDITED, EXPENSE_ADDED, GOAL_COMPLETED,
    GOAL_CREATED, GOAL_DELETED, GOAL_SAVING_ADDED, GOAL_SAVING_CATEGORY, GOAL_UPDATED,
    INCOME_ADDED, INCOME_CATEGORY, MAX_AMOUNT, MAX_TEXT_LEN, PROFILE_UPDATED,
    RECENT_ACTIVITY_LIMIT, SPLIT_GROUP_COMPLETED, SPLIT_GROUP_CREATED, SPLIT_GROUP_UPDATED,
    USER_LOGGED_IN, USER_REGISTERED,
};
use crate::core::balance;
use crate::core::errors::LedgerError;
use crate::core::locks::UserLocks;
use crate::core::models::{
    entry::{EntryKind, LedgerEntry},
    goal::Goal,
    split_group::{SplitGroup, SplitParticipant},
    user::{MonthlySummary, User},
};
use crate::core::reconcile::{BalanceAudit, DriftReport, IntegrityChecker};
use crate::core::summary::{self, Sign};
use crate::infrastructure::analytics::Analytics;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::storage::{EntryOp, GoalOp, LedgerCommit, Storage};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Input for creating an expense or income entry.
#[derive(Clone, Debug, Default)]
pub struct NewEntry {
    pub title: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Input for rewriting an existing entry. The kind and creation time are
/// fixed; only what the entry says changes.
#[derive(Clone, Debug)]
pub struct EntryUpdate {
    pub title: String,
    pub amount: Decimal,
    pub category: Option<String>,
}

/// Profile fields a user may change about themselves. Balance, summaries
/// and credentials are deliberately absent.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub monthly_income: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
}

/// One participant in a split group, either as a known user id or as an
/// identifier (email, phone or username) still to be resolved.
#[derive(Clone, Debug)]
pub struct ParticipantSpec {
    pub user_id: Option<Uuid>,
    pub identifier: Option<String>,
    pub amount_to_pay: Decimal,
}

#[derive(Clone, Debug, Default)]
pub struct SplitGroupUpdate {
    pub title: Option<String>,
    pub creator_upi: Option<String>,
    pub participants: Option<Vec<ParticipantSpec>>,
}

/// Result of a goal contribution.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ContributionOutcome {
    pub goal: Goal,
    pub entry: LedgerEntry,
    /// True only on the contribution that pushed the goal over its target.
    pub completed_now: bool,
}

/// Result of deleting a goal: the balance refund and how many synthetic
/// expenses went with it.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct GoalDeletion {
    pub goal: Goal,
    pub removed_entries: usize,
    pub refunded: Decimal,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SplitCompletion {
    pub group: SplitGroup,
    pub already_completed: bool,
}

/// Current-month view with the derived saving figure.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MonthSummaryView {
    pub month: String,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub saving: Decimal,
    pub categories: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MonthlyLedgerView {
    pub bank_balance: Decimal,
    pub monthly_summaries: Vec<MonthlySummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TrendPoint {
    pub month: String,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub top_category: String,
    pub top_category_amount: Decimal,
}

pub struct LedgerService<S: Storage, N: Notifier, A: Analytics> {
    storage: S,
    notifier: N,
    analytics: A,
    jwt_service: JwtService,
    locks: UserLocks,
    integrity: IntegrityChecker,
}

impl<S: Storage, N: Notifier, A: Analytics> LedgerService<S, N, A> {
    pub fn new(storage: S, notifier: N, analytics: A, jwt_service: JwtService) -> Self {
        LedgerService {
            storage,
            notifier,
            analytics,
            jwt_service,
            locks: UserLocks::new(),
            integrity: IntegrityChecker::new(),
        }
    }

    // VALIDATION HELPERS

    fn validate_string_input(
        &self,
        field: &'static str,
        value: &str,
        max_length: usize,
    ) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidInput {
                field,
                message: format!("{} cannot be empty", field),
            });
        }
        if value.len() > max_length {
            return Err(LedgerError::InvalidInput {
                field,
                message: format!("{} cannot exceed {} characters", field, max_length),
            });
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(LedgerError::InvalidInput {
                field,
                message: format!("{} contains invalid characters", field),
            });
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "{} must be greater than 0",
                field
            )));
        }
        if amount > Decimal::from(MAX_AMOUNT) {
            return Err(LedgerError::InvalidAmount(format!(
                "{} cannot exceed {}",
                field, MAX_AMOUNT
            )));
        }
        if amount.normalize().scale() > 2 {
            return Err(LedgerError::InvalidAmount(format!(
                "{} cannot have more than 2 decimal places",
                field
            )));
        }
        Ok(())
    }

    fn validate_email(&self, email: &str) -> Result<(), LedgerError> {
        if email.is_empty() {
            return Err(LedgerError::MissingField("email"));
        }
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(LedgerError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    fn validate_phone(&self, phone: &str) -> Result<(), LedgerError> {
        if phone.trim().len() < 10 {
            return Err(LedgerError::InvalidPhone);
        }
        Ok(())
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, LedgerError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    // SIDE CHANNELS
    //
    // Notifications and analytics ride along after the ledger work has
    // committed. Their failures are logged and dropped.

    async fn notify_quietly(&self, user_id: Uuid, title: &str, message: &str) {
        if let Err(err) = self.notifier.notify(user_id, title, message).await {
            warn!(%user_id, error = %err, "notification delivery failed");
        }
    }

    async fn track_quietly(&self, user_id: Uuid, event: &str, properties: serde_json::Value) {
        if let Err(err) = self.analytics.track(user_id, event, properties).await {
            warn!(%user_id, event, error = %err, "analytics delivery failed");
        }
    }

    /// Post-commit drift check: re-reads the stored balance and compares
    /// it against `previous + delta`. Runs while the caller still holds
    /// the user's lock, so a legitimate concurrent commit can never be
    /// mistaken for drift.
    async fn verify_balance(
        &self,
        user_id: Uuid,
        operation: &str,
        previous: Decimal,
        delta: Decimal,
    ) -> Result<(), LedgerError> {
        let stored = self.require_user(user_id).await?.bank_balance;
        if let Some(report) = self
            .integrity
            .check(user_id, operation, previous, delta, stored)
            .await
        {
            self.track_quietly(
                user_id,
                BALANCE_DRIFT_DETECTED,
                json!({
                    "operation": report.operation,
                    "expected": report.expected,
                    "stored": report.stored,
                    "difference": report.difference,
                }),
            )
            .await;
        }
        Ok(())
    }

    // AUTH AND PROFILE

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<String>,
    ) -> Result<(User, String), LedgerError> {
        self.validate_email(email)?;
        if password.is_empty() {
            return Err(LedgerError::MissingField("password"));
        }
        self.validate_string_input("name", name, MAX_TEXT_LEN)?;
        if let Some(ref phone) = phone {
            self.validate_phone(phone)?;
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| LedgerError::InternalServerError(format!("Password hashing error: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            username: None,
            email: email.trim().to_lowercase(),
            password_hash,
            phone,
            avatar_url: None,
            bank_balance: Decimal::ZERO,
            monthly_income: Decimal::ZERO,
            coins: 0,
            monthly_summaries: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let user = self.storage.create_user(user).await?;
        let token = self.jwt_service.generate_token(user.id)?;
        self.track_quietly(
            user.id,
            USER_REGISTERED,
            json!({ "email": user.email, "name": user.name }),
        )
        .await;
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), LedgerError> {
        let user = self
            .storage
            .get_user_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        let valid = bcrypt::verify(password, &user.password_hash).map_err(|e| {
            LedgerError::InternalServerError(format!("Password verification error: {}", e))
        })?;
        if !valid {
            return Err(LedgerError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_token(user.id)?;
        self.track_quietly(user.id, USER_LOGGED_IN, json!({ "email": user.email }))
            .await;
        Ok((user, token))
    }

    /// Resolves a bearer token to a live user id. Used by the auth
    /// middleware on every protected request.
    pub async fn resolve_bearer(&self, token: &str) -> Result<Uuid, LedgerError> {
        let user_id = self.jwt_service.user_id_from_token(token)?;
        if self.storage.get_user(user_id).await?.is_none() {
            return Err(LedgerError::Unauthorized(
                "Token refers to an unknown user".to_string(),
            ));
        }
        Ok(user_id)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, LedgerError> {
        self.require_user(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, LedgerError> {
        if let Some(ref name) = update.name {
            self.validate_string_input("name", name, MAX_TEXT_LEN)?;
        }
        if let Some(ref username) = update.username {
            self.validate_string_input("username", username, MAX_TEXT_LEN)?;
        }
        if let Some(ref phone) = update.phone {
            self.validate_phone(phone)?;
        }
        if let Some(ref avatar_url) = update.avatar_url {
            self.validate_string_input("avatar_url", avatar_url, 255)?;
        }
        if let Some(income) = update.monthly_income {
            if income < Decimal::ZERO {
                return Err(LedgerError::InvalidAmount(
                    "monthly_income cannot be negative".to_string(),
                ));
            }
        }

        // Profile writes rewrite the whole user record, so they serialize
        // with ledger commits on the same lock.
        let _guard = self.locks.acquire(user_id).await;
        let mut user = self.require_user(user_id).await?;
        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(username) = update.username {
            user.username = Some(username.trim().to_string());
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(income) = update.monthly_income {
            user.monthly_income = income;
        }
        user.updated_at = Utc::now();
        self.storage.save_user(user.clone()).await?;
        self.track_quietly(user_id, PROFILE_UPDATED, json!({})).await;
        Ok(user)
    }

    // LEDGER ENTRIES

    /// Records a new expense or income: entry persisted, balance moved by
    /// the signed amount, monthly aggregate updated, all in one commit.
    pub async fn add_entry(
        &self,
        user_id: Uuid,
        kind: EntryKind,
        input: NewEntry,
    ) -> Result<LedgerEntry, LedgerError> {
        self.validate_string_input("title", &input.title, MAX_TEXT_LEN)?;
        self.validate_amount_input("amount", input.amount)?;
        let category = match kind {
            // Income ignores caller categories; the aggregate only tracks
            // expense categories.
            EntryKind::Income => INCOME_CATEGORY.to_string(),
            EntryKind::Expense => match input.category {
                Some(category) => {
                    self.validate_string_input("category", &category, MAX_TEXT_LEN)?;
                    category.trim().to_string()
                }
                None => kind.default_category().to_string(),
            },
        };

        let _guard = self.locks.acquire(user_id).await;
        let mut user = self.require_user(user_id).await?;
        let now = Utc::now();
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: input.title.trim().to_string(),
            amount: input.amount,
            category,
            date: input.date.unwrap_or(now),
            goal_id: None,
            created_at: now,
            updated_at: now,
        };

        let previous = user.bank_balance;
        let delta = balance::creation_delta(kind, entry.amount);
        balance::adjust(&mut user, delta);
        summary::apply_delta(
            &mut user.monthly_summaries,
            &summary::month_key(entry.created_at),
            kind,
            &entry.category,
            entry.amount,
            Sign::Add,
        );

        self.storage
            .commit(LedgerCommit::new(user).with_entry(EntryOp::Put(entry.clone())))
            .await?;

        let event = match kind {
            EntryKind::Expense => EXPENSE_ADDED,
            EntryKind::Income => INCOME_ADDED,
        };
        self.verify_balance(user_id, event, previous, delta).await?;
        self.track_quietly(
            user_id,
            event,
            json!({
                "entry_id": entry.id,
                "amount": entry.amount,
                "category": entry.category,
            }),
        )
        .await;
        Ok(entry)
    }

    /// Rewrites an entry. The old version is reversed out of the balance
    /// and aggregates, then the new version applied, as two separate
    /// adjustments; an edit that changes nothing therefore nets to zero.
    pub async fn edit_entry(
        &self,
        user_id: Uuid,
        kind: EntryKind,
        entry_id: Uuid,
        update: EntryUpdate,
    ) -> Result<LedgerEntry, LedgerError> {
        self.validate_string_input("title", &update.title, MAX_TEXT_LEN)?;
        self.validate_amount_input("amount", update.amount)?;
        if let Some(ref category) = update.category {
            self.validate_string_input("category", category, MAX_TEXT_LEN)?;
        }

        let _guard = self.locks.acquire(user_id).await;
        let mut user = self.require_user(user_id).await?;
        let existing = self
            .storage
            .get_entry(kind, entry_id, user_id)
            .await?
            .ok_or(LedgerError::EntryNotFound { kind, id: entry_id })?;

        let category = match kind {
            EntryKind::Income => INCOME_CATEGORY.to_string(),
            EntryKind::Expense => update
                .category
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| existing.category.clone()),
        };

        // Both halves land in the month the entry was created in, even if
        // its display date says otherwise.
        let month = summary::month_key(existing.created_at);
        let previous = user.bank_balance;

        let reversal = balance::reversal_delta(existing.kind, existing.amount);
        balance::adjust(&mut user, reversal);
        summary::apply_delta(
            &mut user.monthly_summaries,
            &month,
            existing.kind,
            &existing.category,
            existing.amount,
            Sign::Remove,
        );

        let mut updated = existing;
        updated.title = update.title.trim().to_string();
        updated.amount = update.amount;
        updated.category = category;
        updated.updated_at = Utc::now();

        let fresh = balance::creation_delta(updated.kind, updated.amount);
        balance::adjust(&mut user, fresh);
        summary::apply_delta(
            &mut user.monthly_summaries,
            &month,
            updated.kind,
            &updated.category,
            updated.amount,
            Sign::Add,
        );

        self.storage
            .commit(LedgerCommit::new(user).with_entry(EntryOp::Put(updated.clone())))
            .await?;

        self.verify_balance(user_id, ENTRY_EDITED, previous, reversal + fresh)
            .await?;
        self.track_quietly(
            user_id,
            ENTRY_EDITED,
            json!({ "entry_id": updated.id, "kind": updated.kind }),
        )
        .await;
        Ok(updated)
    }

    /// Deletes an entry and reverses its effect, returning the removed
    /// record.
    pub async fn delete_entry(
        &self,
        user_id: Uuid,
        kind: EntryKind,
        entry_id: Uuid,
    ) -> Result<LedgerEntry, LedgerError> {
        let _guard = self.locks.acquire(user_id).await;
        let mut user = self.require_user(user_id).await?;
        let existing = self
            .storage
            .get_entry(kind, entry_id, user_id)
            .await?
            .ok_or(LedgerError::EntryNotFound { kind, id: entry_id })?;

        let previous = user.bank_balance;
        let delta = balance::reversal_delta(existing.kind, existing.amount);
        balance::adjust(&mut user, delta);
        summary::apply_delta(
            &mut user.monthly_summaries,
            &summary::month_key(existing.created_at),
            existing.kind,
            &existing.category,
            existing.amount,
            Sign::Remove,
        );

        self.storage
            .commit(LedgerCommit::new(user).with_entry(EntryOp::Delete { kind, id: entry_id }))
            .await?;

        self.verify_balance(user_id, ENTRY_DELETED, previous, delta)
            .await?;
        self.track_quietly(
            user_id,
            ENTRY_DELETED,
            json!({ "entry_id": entry_id, "kind": kind }),
        )
        .await;
        Ok(existing)
    }

    /// The ten most recent entries across both kinds, newest first.
    pub async fn recent_activity(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut merged = self.full_activity(user_id).await?;
        merged.truncate(RECENT_ACTIVITY_LIMIT);
        Ok(merged)
    }

    /// Every entry the user has, newest first.
    pub async fn full_activity(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.require_user(user_id).await?;
        let mut merged = self
            .storage
            .entries_for_user(EntryKind::Expense, user_id)
            .await?;
        merged.extend(
            self.storage
                .entries_for_user(EntryKind::Income, user_id)
                .await?,
        );
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(merged)
    }

    // SUMMARIES

    pub async fn current_summary(&self, user_id: Uuid) -> Result<MonthSummaryView, LedgerError> {
        let user = self.require_user(user_id).await?;
        let month = summary::month_key(Utc::now());
        let view = match user.summary_for(&month) {
            Some(s) => MonthSummaryView {
                month,
                total_expense: s.total_expense,
                total_income: s.total_income,
                saving: s.total_income - s.total_expense,
                categories: s.categories.clone(),
            },
            None => MonthSummaryView {
                month,
                total_expense: Decimal::ZERO,
                total_income: Decimal::ZERO,
                saving: Decimal::ZERO,
                categories: BTreeMap::new(),
            },
        };
        Ok(view)
    }

    pub async fn monthly_ledger(&self, user_id: Uuid) -> Result<MonthlyLedgerView, LedgerError> {
        let user = self.require_user(user_id).await?;
        let mut monthly_summaries = user.monthly_summaries;
        monthly_summaries.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(MonthlyLedgerView {
            bank_balance: user.bank_balance,
            monthly_summaries,
        })
    }

    /// All-time expense totals per category, folded across every month.
    pub async fn category_totals(
        &self,
        user_id: Uuid,
    ) -> Result<BTreeMap<String, Decimal>, LedgerError> {
        let user = self.require_user(user_id).await?;
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for summary in &user.monthly_summaries {
            for (category, amount) in &summary.categories {
                *totals.entry(category.clone()).or_insert(Decimal::ZERO) += *amount;
            }
        }
        Ok(totals)
    }

    /// Month-by-month trend with each month's heaviest spending category.
    /// Ties go to the lexicographically first category; months with no
    /// expenses report "None".
    pub async fn monthly_trends(&self, user_id: Uuid) -> Result<Vec<TrendPoint>, LedgerError> {
        let user = self.require_user(user_id).await?;
        let mut summaries = user.monthly_summaries;
        summaries.sort_by(|a, b| a.month.cmp(&b.month));

        let trends = summaries
            .into_iter()
            .map(|s| {
                let mut top_category = "None".to_string();
                let mut top_category_amount = Decimal::ZERO;
                for (category, amount) in &s.categories {
                    if *amount > top_category_amount {
                        top_category = category.clone();
                        top_category_amount = *amount;
                    }
                }
                TrendPoint {
                    month: s.month,
                    total_expense: s.total_expense,
                    total_income: s.total_income,
                    top_category,
                    top_category_amount,
                }
            })
            .collect();
        Ok(trends)
    }

    // SAVINGS GOALS

    pub async fn goals(&self, user_id: Uuid) -> Result<Vec<Goal>, LedgerError> {
        self.require_user(user_id).await?;
        let mut goals = self.storage.goals_for_user(user_id).await?;
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    pub async fn goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Goal, LedgerError> {
        self.storage
            .get_goal(goal_id, user_id)
            .await?
            .ok_or(LedgerError::GoalNotFound(goal_id))
    }

    /// Creates a goal. No money moves until the first contribution.
    pub async fn create_goal(
        &self,
        user_id: Uuid,
        title: &str,
        amount: Decimal,
    ) -> Result<Goal, LedgerError> {
        self.validate_string_input("title", title, MAX_TEXT_LEN)?;
        self.validate_amount_input("amount", amount)?;
        self.require_user(user_id).await?;

        let now = Utc::now();
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id,
            title: title.trim().to_string(),
            amount,
            saved: Decimal::ZERO,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_goal(goal.clone()).await?;
        self.track_quietly(
            user_id,
            GOAL_CREATED,
            json!({ "goal_id": goal.id, "title": goal.title, "amount": goal.amount }),
        )
        .await;
        Ok(goal)
    }

    /// Renames or retargets a goal. Completion is re-derived, so raising
    /// the target above the saved sum reopens the goal.
    pub async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        update: GoalUpdate,
    ) -> Result<Goal, LedgerError> {
        if let Some(ref title) = update.title {
            self.validate_string_input("title", title, MAX_TEXT_LEN)?;
        }
        if let Some(amount) = update.amount {
            self.validate_amount_input("amount", amount)?;
        }

        let _guard = self.locks.acquire(user_id).await;
        let mut goal = self
            .storage
            .get_goal(goal_id, user_id)
            .await?
            .ok_or(LedgerError::GoalNotFound(goal_id))?;
        if let Some(title) = update.title {
            goal.title = title.trim().to_string();
        }
        if let Some(amount) = update.amount {
            goal.amount = amount;
        }
        goal.recalculate_completed();
        goal.updated_at = Utc::now();
        self.storage.save_goal(goal.clone()).await?;
        self.track_quietly(
            user_id,
            GOAL_UPDATED,
            json!({ "goal_id": goal.id, "amount": goal.amount }),
        )
        .await;
        Ok(goal)
    }

    /// Moves money into a goal: writes a synthetic expense entry tagged
    /// with the goal id, drops the balance and raises the goal's saved
    /// sum, all in one commit.
    pub async fn add_saving(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        amount: Decimal,
    ) -> Result<ContributionOutcome, LedgerError> {
        self.validate_amount_input("amount", amount)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut user = self.require_user(user_id).await?;
        let mut goal = self
            .storage
            .get_goal(goal_id, user_id)
            .await?
            .ok_or(LedgerError::GoalNotFound(goal_id))?;

        let was_completed = goal.completed;
        let now = Utc::now();
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            user_id,
            kind: EntryKind::Expense,
            title: format!("Saving for {}", goal.title),
            amount,
            category: GOAL_SAVING_CATEGORY.to_string(),
            date: now,
            goal_id: Some(goal.id),
            created_at: now,
            updated_at: now,
        };

        let previous = user.bank_balance;
        let delta = balance::creation_delta(EntryKind::Expense, amount);
        balance::adjust(&mut user, delta);
        summary::apply_delta(
            &mut user.monthly_summaries,
            &summary::month_key(entry.created_at),
            EntryKind::Expense,
            &entry.category,
            entry.amount,
            Sign::Add,
        );

        goal.saved += amount;
        goal.recalculate_completed();
        goal.updated_at = now;
        let completed_now = !was_completed && goal.completed;

        self.storage
            .commit(
                LedgerCommit::new(user)
                    .with_entry(EntryOp::Put(entry.clone()))
                    .with_goal(GoalOp::Put(goal.clone())),
            )
            .await?;

        self.verify_balance(user_id, GOAL_SAVING_ADDED, previous, delta)
            .await?;
        self.track_quietly(
            user_id,
            GOAL_SAVING_ADDED,
            json!({ "goal_id": goal.id, "amount": amount, "saved": goal.saved }),
        )
        .await;
        if completed_now {
            self.notify_quietly(
                user_id,
                "Goal achieved",
                &format!("You reached your savings goal \"{}\"", goal.title),
            )
            .await;
            self.track_quietly(
                user_id,
                GOAL_COMPLETED,
                json!({ "goal_id": goal.id, "title": goal.title, "amount": goal.amount }),
            )
            .await;
        }
        Ok(ContributionOutcome {
            goal,
            entry,
            completed_now,
        })
    }

    /// Deletes a goal and gives the saved money back: every synthetic
    /// expense recorded for the goal is removed and reversed out of its
    /// month, and the balance is refunded by the goal's saved sum.
    pub async fn delete_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
    ) -> Result<GoalDeletion, LedgerError> {
        let _guard = self.locks.acquire(user_id).await;
        let mut user = self.require_user(user_id).await?;
        let goal = self
            .storage
            .get_goal(goal_id, user_id)
            .await?
            .ok_or(LedgerError::GoalNotFound(goal_id))?;
        let synthetics = self.storage.entries_for_goal(user_id, goal_id).await?;

        let previous = user.bank_balance;
        let refund = goal.saved;
        balance::adjust(&mut user, refund);

        let mut commit = LedgerCommit::new(user);
        for entry in &synthetics {
            summary::apply_delta(
                &mut commit.user.monthly_summaries,
                &summary::month_key(entry.created_at),
                entry.kind,
                &entry.category,
                entry.amount,
                Sign::Remove,
            );
            commit.entry_ops.push(EntryOp::Delete {
                kind: entry.kind,
                id: entry.id,
            });
        }
        commit.goal_op = Some(GoalOp::Delete(goal_id));

        self.storage.commit(commit).await?;

        self.verify_balance(user_id, GOAL_DELETED, previous, refund)
            .await?;
        self.track_quietly(
            user_id,
            GOAL_DELETED,
            json!({
                "goal_id": goal_id,
                "removed_entries": synthetics.len(),
                "refunded": refund,
            }),
        )
        .await;
        Ok(GoalDeletion {
            goal,
            removed_entries: synthetics.len(),
            refunded: refund,
        })
    }

    // SPLIT GROUPS

    async fn resolve_participant(
        &self,
        spec: &ParticipantSpec,
    ) -> Result<SplitParticipant, LedgerError> {
        if spec.amount_to_pay < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(
                "amount_to_pay cannot be negative".to_string(),
            ));
        }
        let user = if let Some(user_id) = spec.user_id {
            self.storage
                .get_user(user_id)
                .await?
                .ok_or_else(|| LedgerError::ParticipantNotFound(user_id.to_string()))?
        } else {
            let identifier = spec
                .identifier
                .as_deref()
                .ok_or(LedgerError::MissingField("identifier"))?;
            self.storage
                .find_user_by_identifier(identifier)
                .await?
                .ok_or_else(|| LedgerError::ParticipantNotFound(identifier.to_string()))?
        };
        Ok(SplitParticipant {
            user_id: user.id,
            name: user.name,
            amount_to_pay: spec.amount_to_pay,
        })
    }

    /// Creates a split group. Every participant must resolve to a
    /// registered user or the whole request fails; nothing is saved on a
    /// partial resolution.
    pub async fn create_split_group(
        &self,
        creator_id: Uuid,
        title: &str,
        creator_upi: &str,
        participants: Vec<ParticipantSpec>,
    ) -> Result<SplitGroup, LedgerError> {
        self.validate_string_input("title", title, MAX_TEXT_LEN)?;
        self.validate_string_input("creator_upi", creator_upi, MAX_TEXT_LEN)?;
        if participants.is_empty() {
            return Err(LedgerError::MissingField("participants"));
        }
        let creator = self.require_user(creator_id).await?;

        let mut resolved = Vec::with_capacity(participants.len());
        for spec in &participants {
            resolved.push(self.resolve_participant(spec).await?);
        }

        let now = Utc::now();
        let group = SplitGroup {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            creator_id,
            creator_upi: creator_upi.trim().to_string(),
            participants: resolved,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_group(group.clone()).await?;

        futures::future::join_all(group.participants.iter().map(|p| {
            let message = format!("{} added you to \"{}\"", creator.name, group.title);
            async move { self.notify_quietly(p.user_id, "New split", &message).await }
        }))
        .await;
        self.track_quietly(
            creator_id,
            SPLIT_GROUP_CREATED,
            json!({ "group_id": group.id, "participants": group.participants.len() }),
        )
        .await;
        Ok(group)
    }

    pub async fn my_created_groups(&self, user_id: Uuid) -> Result<Vec<SplitGroup>, LedgerError> {
        self.require_user(user_id).await?;
        let mut groups = self.storage.groups_created_by(user_id).await?;
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }

    /// Groups the user participates in but did not create.
    pub async fn my_participating_groups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SplitGroup>, LedgerError> {
        self.require_user(user_id).await?;
        let mut groups = self.storage.groups_with_participant(user_id).await?;
        groups.retain(|g| g.creator_id != user_id);
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }

    /// Visible to the creator and participants only; everyone else gets
    /// not-found rather than a hint the group exists.
    pub async fn split_group(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<SplitGroup, LedgerError> {
        let group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or(LedgerError::GroupNotFound(group_id))?;
        if !group.includes(user_id) {
            return Err(LedgerError::GroupNotFound(group_id));
        }
        Ok(group)
    }

    /// Creator-only edit. A participant list, when given, replaces the
    /// existing one wholesale after every member resolves.
    pub async fn edit_split_group(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        update: SplitGroupUpdate,
    ) -> Result<SplitGroup, LedgerError> {
        if let Some(ref title) = update.title {
            self.validate_string_input("title", title, MAX_TEXT_LEN)?;
        }
        if let Some(ref upi) = update.creator_upi {
            self.validate_string_input("creator_upi", upi, MAX_TEXT_LEN)?;
        }

        let mut group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or(LedgerError::GroupNotFound(group_id))?;
        if group.creator_id != user_id {
            return Err(LedgerError::NotGroupCreator("edit this group"));
        }

        if let Some(title) = update.title {
            group.title = title.trim().to_string();
        }
        if let Some(upi) = update.creator_upi {
            group.creator_upi = upi.trim().to_string();
        }
        if let Some(specs) = update.participants {
            if specs.is_empty() {
                return Err(LedgerError::MissingField("participants"));
            }
            let mut resolved = Vec::with_capacity(specs.len());
            for spec in &specs {
                resolved.push(self.resolve_participant(spec).await?);
            }
            group.participants = resolved;
        }
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;

        futures::future::join_all(group.participants.iter().map(|p| {
            let message = format!("\"{}\" was updated", group.title);
            async move { self.notify_quietly(p.user_id, "Split updated", &message).await }
        }))
        .await;
        self.track_quietly(
            user_id,
            SPLIT_GROUP_UPDATED,
            json!({ "group_id": group.id }),
        )
        .await;
        Ok(group)
    }

    /// Creator-only completion flag. Idempotent: completing an already
    /// completed group reports that and changes nothing.
    pub async fn complete_split_group(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<SplitCompletion, LedgerError> {
        let mut group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or(LedgerError::GroupNotFound(group_id))?;
        if group.creator_id != user_id {
            return Err(LedgerError::NotGroupCreator("mark this group complete"));
        }
        if group.is_completed {
            return Ok(SplitCompletion {
                group,
                already_completed: true,
            });
        }

        group.is_completed = true;
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;

        futures::future::join_all(group.participants.iter().map(|p| {
            let message = format!("\"{}\" was settled", group.title);
            async move { self.notify_quietly(p.user_id, "Split completed", &message).await }
        }))
        .await;
        self.track_quietly(
            user_id,
            SPLIT_GROUP_COMPLETED,
            json!({ "group_id": group.id }),
        )
        .await;
        Ok(SplitCompletion {
            group,
            already_completed: false,
        })
    }

    // INTEGRITY

    /// Drift reports recorded for this user, oldest first.
    pub async fn drift_reports(&self, user_id: Uuid) -> Result<Vec<DriftReport>, LedgerError> {
        self.require_user(user_id).await?;
        Ok(self.integrity.reports_for(user_id).await)
    }

    /// Replays the user's entire ledger against the stored balance and
    /// monthly summaries, recording a drift report on mismatch.
    pub async fn audit_balance(&self, user_id: Uuid) -> Result<BalanceAudit, LedgerError> {
        let _guard = self.locks.acquire(user_id).await;
        let user = self.require_user(user_id).await?;
        let expenses = self
            .storage
            .entries_for_user(EntryKind::Expense, user_id)
            .await?;
        let incomes = self
            .storage
            .entries_for_user(EntryKind::Income, user_id)
            .await?;
        let audit = self
            .integrity
            .audit(
                user_id,
                user.bank_balance,
                &user.monthly_summaries,
                &expenses,
                &incomes,
            )
            .await;
        if !audit.consistent || !audit.summaries_consistent {
            self.track_quietly(
                user_id,
                BALANCE_DRIFT_DETECTED,
                json!({
                    "operation": "balance_audit",
                    "expected": audit.recomputed_balance,
                    "stored": audit.stored_balance,
                    "summaries_consistent": audit.summaries_consistent,
                }),
            )
            .await;
        }
        Ok(audit)
    }
}
