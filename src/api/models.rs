use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::errors::LedgerError;
use crate::core::models::user::User;
use crate::core::services::{
    EntryUpdate, GoalUpdate, NewEntry, ParticipantSpec, ProfileUpdate, SplitGroupUpdate,
};

// Request structs for JSON payloads

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub monthly_income: Option<Decimal>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            username: req.username,
            phone: req.phone,
            avatar_url: req.avatar_url,
            monthly_income: req.monthly_income,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AddEntryRequest {
    pub title: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl From<AddEntryRequest> for NewEntry {
    fn from(req: AddEntryRequest) -> Self {
        NewEntry {
            title: req.title,
            amount: req.amount,
            category: req.category,
            date: req.date,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EditEntryRequest {
    pub title: String,
    pub amount: Decimal,
    pub category: Option<String>,
}

impl From<EditEntryRequest> for EntryUpdate {
    fn from(req: EditEntryRequest) -> Self {
        EntryUpdate {
            title: req.title,
            amount: req.amount,
            category: req.category,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGoalRequest {
    pub title: String,
    pub amount: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
}

impl From<UpdateGoalRequest> for GoalUpdate {
    fn from(req: UpdateGoalRequest) -> Self {
        GoalUpdate {
            title: req.title,
            amount: req.amount,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AddSavingRequest {
    pub amount: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct ParticipantRequest {
    /// Known user id; takes precedence over `identifier` when both are set.
    pub user_id: Option<Uuid>,
    /// Email, phone or username to resolve.
    pub identifier: Option<String>,
    pub amount_to_pay: Decimal,
}

impl From<ParticipantRequest> for ParticipantSpec {
    fn from(req: ParticipantRequest) -> Self {
        ParticipantSpec {
            user_id: req.user_id,
            identifier: req.identifier,
            amount_to_pay: req.amount_to_pay,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSplitGroupRequest {
    pub title: String,
    pub creator_upi: String,
    pub participants: Vec<ParticipantRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditSplitGroupRequest {
    pub title: Option<String>,
    pub creator_upi: Option<String>,
    pub participants: Option<Vec<ParticipantRequest>>,
}

impl From<EditSplitGroupRequest> for SplitGroupUpdate {
    fn from(req: EditSplitGroupRequest) -> Self {
        SplitGroupUpdate {
            title: req.title,
            creator_upi: req.creator_upi,
            participants: req
                .participants
                .map(|ps| ps.into_iter().map(ParticipantSpec::from).collect()),
        }
    }
}

// Response views

/// Public view of a user; credentials never leave the service.
#[derive(Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bank_balance: Decimal,
    pub monthly_income: Decimal,
    pub coins: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            phone: user.phone,
            avatar_url: user.avatar_url,
            bank_balance: user.bank_balance,
            monthly_income: user.monthly_income,
            coins: user.coins,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// All-time expense totals per category.
#[derive(Serialize, ToSchema)]
pub struct CategoryTotalsResponse {
    pub categories: std::collections::BTreeMap<String, Decimal>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            LedgerError::MissingField(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::InvalidInput { .. }
            | LedgerError::InvalidEmail(_)
            | LedgerError::InvalidPhone => StatusCode::BAD_REQUEST,
            LedgerError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            LedgerError::InvalidCredentials | LedgerError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            LedgerError::UserNotFound(_)
            | LedgerError::EntryNotFound { .. }
            | LedgerError::GoalNotFound(_)
            | LedgerError::GroupNotFound(_)
            | LedgerError::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::NotGroupCreator(_) => StatusCode::FORBIDDEN,
            LedgerError::StorageError(_)
            | LedgerError::NotificationError(_)
            | LedgerError::AnalyticsError(_)
            | LedgerError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
