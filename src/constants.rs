//! Shared constants: category defaults, validation bounds and the
//! analytics event names emitted by the service layer.

/// Category applied to an expense when the caller omits one.
pub const DEFAULT_EXPENSE_CATEGORY: &str = "Others";

/// Fixed category carried by every income entry.
pub const INCOME_CATEGORY: &str = "Income";

/// Category of the synthetic expenses written by goal contributions.
pub const GOAL_SAVING_CATEGORY: &str = "Goal Saving";

/// Upper bound on any single monetary amount, in whole currency units.
pub const MAX_AMOUNT: i64 = 1_000_000;

/// Upper bound on names, titles and categories.
pub const MAX_TEXT_LEN: usize = 100;

/// Number of entries returned by the recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

// Analytics event names.
pub const USER_REGISTERED: &str = "user_registered";
pub const USER_LOGGED_IN: &str = "user_logged_in";
pub const PROFILE_UPDATED: &str = "profile_updated";
pub const EXPENSE_ADDED: &str = "expense_added";
pub const INCOME_ADDED: &str = "income_added";
pub const ENTRY_EDITED: &str = "entry_edited";
pub const ENTRY_DELETED: &str = "entry_deleted";
pub const GOAL_CREATED: &str = "goal_created";
pub const GOAL_UPDATED: &str = "goal_updated";
pub const GOAL_SAVING_ADDED: &str = "goal_saving_added";
pub const GOAL_COMPLETED: &str = "goal_completed";
pub const GOAL_DELETED: &str = "goal_deleted";
pub const SPLIT_GROUP_CREATED: &str = "split_group_created";
pub const SPLIT_GROUP_UPDATED: &str = "split_group_updated";
pub const SPLIT_GROUP_COMPLETED: &str = "split_group_completed";
pub const BALANCE_DRIFT_DETECTED: &str = "balance_drift_detected";
