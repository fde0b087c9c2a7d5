pub mod entry;
pub mod events;
pub mod goal;
pub mod split_group;
pub mod user;

pub use entry::{EntryKind, LedgerEntry};
pub use events::{AnalyticsEvent, NotificationRecord};
pub use goal::Goal;
pub use split_group::{SplitGroup, SplitParticipant};
pub use user::{MonthlySummary, User};
