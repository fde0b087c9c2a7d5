use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{
    api::models::{
        AddEntryRequest, AddSavingRequest, AuthResponse, CategoryTotalsResponse,
        CreateGoalRequest, CreateSplitGroupRequest, EditEntryRequest, EditSplitGroupRequest,
        ErrorResponse, LoginRequest, ParticipantRequest, RegisterRequest, UpdateGoalRequest,
        UpdateProfileRequest, UserProfile,
    },
    core::{
        models::{
            entry::{EntryKind, LedgerEntry},
            goal::Goal,
            split_group::{SplitGroup, SplitParticipant},
            user::MonthlySummary,
        },
        reconcile::{BalanceAudit, DriftReport},
        services::{
            ContributionOutcome, GoalDeletion, MonthSummaryView, MonthlyLedgerView,
            SplitCompletion, TrendPoint,
        },
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register,
        super::handlers::login,
        super::handlers::get_profile,
        super::handlers::update_profile,
        super::handlers::add_expense,
        super::handlers::add_income,
        super::handlers::edit_entry,
        super::handlers::delete_entry,
        super::handlers::recent_activity,
        super::handlers::full_activity,
        super::handlers::current_summary,
        super::handlers::monthly_ledger,
        super::handlers::category_totals,
        super::handlers::monthly_trends,
        super::handlers::list_goals,
        super::handlers::create_goal,
        super::handlers::get_goal,
        super::handlers::update_goal,
        super::handlers::delete_goal,
        super::handlers::add_saving,
        super::handlers::create_split_group,
        super::handlers::my_created_splits,
        super::handlers::my_participating_splits,
        super::handlers::get_split_group,
        super::handlers::edit_split_group,
        super::handlers::complete_split_group,
        super::handlers::drift_reports,
        super::handlers::audit_balance
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        AddEntryRequest,
        EditEntryRequest,
        CreateGoalRequest,
        UpdateGoalRequest,
        AddSavingRequest,
        ParticipantRequest,
        CreateSplitGroupRequest,
        EditSplitGroupRequest,
        ErrorResponse,
        AuthResponse,
        UserProfile,
        CategoryTotalsResponse,
        EntryKind,
        LedgerEntry,
        MonthlySummary,
        Goal,
        SplitGroup,
        SplitParticipant,
        MonthSummaryView,
        MonthlyLedgerView,
        TrendPoint,
        ContributionOutcome,
        GoalDeletion,
        SplitCompletion,
        DriftReport,
        BalanceAudit
    )),
    modifiers(&SecurityAddon),
    info(
        title = "Fintrack API",
        description = "Personal finance ledger: expenses, income, savings goals and bill splits",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
