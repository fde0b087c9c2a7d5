use thiserror::Error;
use uuid::Uuid;

use crate::core::models::entry::EntryKind;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input for field `{field}`: {message}")]
    InvalidInput { field: &'static str, message: String },
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Invalid phone number")]
    InvalidPhone,
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("User {0} not found")]
    UserNotFound(Uuid),
    #[error("{kind} entry {id} not found")]
    EntryNotFound { kind: EntryKind, id: Uuid },
    #[error("Goal {0} not found")]
    GoalNotFound(Uuid),
    #[error("Split group {0} not found")]
    GroupNotFound(Uuid),
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),
    #[error("Only the group creator can {0}")]
    NotGroupCreator(&'static str),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("Analytics error: {0}")]
    AnalyticsError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}
