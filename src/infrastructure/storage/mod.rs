use crate::core::errors::LedgerError;
use crate::core::models::{
    entry::{EntryKind, LedgerEntry},
    goal::Goal,
    split_group::SplitGroup,
    user::User,
};
use async_trait::async_trait;
use uuid::Uuid;

/// One entry mutation inside a [`LedgerCommit`].
#[derive(Clone, Debug)]
pub enum EntryOp {
    Put(LedgerEntry),
    Delete { kind: EntryKind, id: Uuid },
}

/// Goal mutation inside a [`LedgerCommit`].
#[derive(Clone, Debug)]
pub enum GoalOp {
    Put(Goal),
    Delete(Uuid),
}

/// An atomic unit of ledger work: the rewritten user record (balance and
/// monthly summaries already updated) together with the entry and goal
/// changes that justify it. Storage applies the whole commit or none of
/// it; a partially applied commit must never become observable.
#[derive(Clone, Debug)]
pub struct LedgerCommit {
    pub user: User,
    pub entry_ops: Vec<EntryOp>,
    pub goal_op: Option<GoalOp>,
}

impl LedgerCommit {
    pub fn new(user: User) -> Self {
        LedgerCommit {
            user,
            entry_ops: Vec::new(),
            goal_op: None,
        }
    }

    pub fn with_entry(mut self, op: EntryOp) -> Self {
        self.entry_ops.push(op);
        self
    }

    pub fn with_goal(mut self, op: GoalOp) -> Self {
        self.goal_op = Some(op);
        self
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts a new user, failing when the email is already taken.
    async fn create_user(&self, user: User) -> Result<User, LedgerError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, LedgerError>;
    /// Lookup by email, phone or username, as used when resolving split
    /// participants.
    async fn find_user_by_identifier(&self, identifier: &str)
        -> Result<Option<User>, LedgerError>;
    /// Rewrites a user record without any accompanying ledger change
    /// (profile edits). Balance-moving writes go through [`commit`].
    ///
    /// [`commit`]: Storage::commit
    async fn save_user(&self, user: User) -> Result<(), LedgerError>;

    /// Fetches an entry only when it belongs to `user_id`.
    async fn get_entry(
        &self,
        kind: EntryKind,
        entry_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError>;
    async fn entries_for_user(
        &self,
        kind: EntryKind,
        user_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerError>;
    /// The synthetic expenses recorded for one goal.
    async fn entries_for_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerError>;

    async fn get_goal(&self, goal_id: Uuid, user_id: Uuid) -> Result<Option<Goal>, LedgerError>;
    async fn goals_for_user(&self, user_id: Uuid) -> Result<Vec<Goal>, LedgerError>;
    async fn save_goal(&self, goal: Goal) -> Result<(), LedgerError>;

    async fn save_group(&self, group: SplitGroup) -> Result<(), LedgerError>;
    async fn get_group(&self, group_id: Uuid) -> Result<Option<SplitGroup>, LedgerError>;
    async fn groups_created_by(&self, user_id: Uuid) -> Result<Vec<SplitGroup>, LedgerError>;
    async fn groups_with_participant(&self, user_id: Uuid)
        -> Result<Vec<SplitGroup>, LedgerError>;

    /// Applies an atomic ledger commit.
    async fn commit(&self, commit: LedgerCommit) -> Result<(), LedgerError>;
}

pub mod in_memory;
