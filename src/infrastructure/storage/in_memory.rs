use crate::core::errors::LedgerError;
use crate::core::models::{
    entry::{EntryKind, LedgerEntry},
    goal::Goal,
    split_group::SplitGroup,
    user::User,
};
use crate::infrastructure::storage::{EntryOp, GoalOp, LedgerCommit, Storage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    expenses: Arc<RwLock<HashMap<Uuid, LedgerEntry>>>,
    incomes: Arc<RwLock<HashMap<Uuid, LedgerEntry>>>,
    goals: Arc<RwLock<HashMap<Uuid, Goal>>>,
    groups: Arc<RwLock<HashMap<Uuid, SplitGroup>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }

    fn entry_map(&self, kind: EntryKind) -> &Arc<RwLock<HashMap<Uuid, LedgerEntry>>> {
        match kind {
            EntryKind::Expense => &self.expenses,
            EntryKind::Income => &self.incomes,
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, LedgerError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(LedgerError::EmailAlreadyRegistered(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, LedgerError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, LedgerError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.matches_identifier(identifier))
            .cloned())
    }

    async fn save_user(&self, user: User) -> Result<(), LedgerError> {
        let mut users = self.users.write().await;
        users.insert(user.id, user);
        Ok(())
    }

    async fn get_entry(
        &self,
        kind: EntryKind,
        entry_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let entries = self.entry_map(kind).read().await;
        Ok(entries
            .get(&entry_id)
            .filter(|e| e.user_id == user_id)
            .cloned())
    }

    async fn entries_for_user(
        &self,
        kind: EntryKind,
        user_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let entries = self.entry_map(kind).read().await;
        Ok(entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn entries_for_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .values()
            .filter(|e| e.user_id == user_id && e.goal_id == Some(goal_id))
            .cloned()
            .collect())
    }

    async fn get_goal(&self, goal_id: Uuid, user_id: Uuid) -> Result<Option<Goal>, LedgerError> {
        let goals = self.goals.read().await;
        Ok(goals
            .get(&goal_id)
            .filter(|g| g.user_id == user_id)
            .cloned())
    }

    async fn goals_for_user(&self, user_id: Uuid) -> Result<Vec<Goal>, LedgerError> {
        let goals = self.goals.read().await;
        Ok(goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_goal(&self, goal: Goal) -> Result<(), LedgerError> {
        let mut goals = self.goals.write().await;
        goals.insert(goal.id, goal);
        Ok(())
    }

    async fn save_group(&self, group: SplitGroup) -> Result<(), LedgerError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id, group);
        Ok(())
    }

    async fn get_group(&self, group_id: Uuid) -> Result<Option<SplitGroup>, LedgerError> {
        let groups = self.groups.read().await;
        Ok(groups.get(&group_id).cloned())
    }

    async fn groups_created_by(&self, user_id: Uuid) -> Result<Vec<SplitGroup>, LedgerError> {
        let groups = self.groups.read().await;
        Ok(groups
            .values()
            .filter(|g| g.creator_id == user_id)
            .cloned()
            .collect())
    }

    async fn groups_with_participant(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SplitGroup>, LedgerError> {
        let groups = self.groups.read().await;
        Ok(groups
            .values()
            .filter(|g| g.has_participant(user_id))
            .cloned()
            .collect())
    }

    async fn commit(&self, commit: LedgerCommit) -> Result<(), LedgerError> {
        // All write locks taken up front, always in the same order, so the
        // commit lands as one unit and never interleaves with another.
        let mut users = self.users.write().await;
        let mut expenses = self.expenses.write().await;
        let mut incomes = self.incomes.write().await;
        let mut goals = self.goals.write().await;

        for op in commit.entry_ops {
            match op {
                EntryOp::Put(entry) => {
                    let map = match entry.kind {
                        EntryKind::Expense => &mut expenses,
                        EntryKind::Income => &mut incomes,
                    };
                    map.insert(entry.id, entry);
                }
                EntryOp::Delete { kind, id } => {
                    let map = match kind {
                        EntryKind::Expense => &mut expenses,
                        EntryKind::Income => &mut incomes,
                    };
                    map.remove(&id);
                }
            }
        }
        if let Some(op) = commit.goal_op {
            match op {
                GoalOp::Put(goal) => {
                    goals.insert(goal.id, goal);
                }
                GoalOp::Delete(goal_id) => {
                    goals.remove(&goal_id);
                }
            }
        }
        users.insert(commit.user.id, commit.user);
        Ok(())
    }
}
