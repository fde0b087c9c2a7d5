use crate::{
    api::models::*,
    auth::CurrentUser,
    core::{
        errors::LedgerError,
        models::{
            entry::{EntryKind, LedgerEntry},
            goal::Goal,
            split_group::SplitGroup,
        },
        reconcile::{BalanceAudit, DriftReport},
        services::{
            ContributionOutcome, GoalDeletion, LedgerService, MonthSummaryView,
            MonthlyLedgerView, SplitCompletion, TrendPoint,
        },
    },
    infrastructure::{
        analytics::in_memory::InMemoryAnalytics, notify::in_memory::InMemoryNotifier,
        storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;
use uuid::Uuid;

use std::sync::Arc;

/// The service as wired in this binary: in-memory storage and in-memory
/// side channels.
pub type AppService = LedgerService<InMemoryStorage, InMemoryNotifier, InMemoryAnalytics>;

/// Middleware validating the bearer token and stashing the caller's id in
/// request extensions. Handlers never take identity from request bodies.
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| LedgerError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| LedgerError::Unauthorized("Invalid Authorization header".to_string()))?;

    let user_id = service.resolve_bearer(token).await?;
    req.extensions_mut().insert(CurrentUser { id: user_id });
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/profile/me", axum::routing::get(get_profile))
        .route("/profile/me", axum::routing::patch(update_profile))
        .route("/expense/add", axum::routing::post(add_expense))
        .route("/income/add", axum::routing::post(add_income))
        .route(
            "/transactions/edit/{kind}/{entry_id}",
            axum::routing::put(edit_entry),
        )
        .route(
            "/transactions/delete/{kind}/{entry_id}",
            axum::routing::delete(delete_entry),
        )
        .route("/transactions/recent", axum::routing::get(recent_activity))
        .route("/transactions/activity", axum::routing::get(full_activity))
        .route("/summary", axum::routing::get(current_summary))
        .route("/summary/monthly", axum::routing::get(monthly_ledger))
        .route("/summary/category", axum::routing::get(category_totals))
        .route("/summary/trends", axum::routing::get(monthly_trends))
        .route("/goals", axum::routing::get(list_goals))
        .route("/goals", axum::routing::post(create_goal))
        .route("/goals/{goal_id}", axum::routing::get(get_goal))
        .route("/goals/{goal_id}", axum::routing::put(update_goal))
        .route("/goals/{goal_id}", axum::routing::delete(delete_goal))
        .route(
            "/goals/{goal_id}/add-saving",
            axum::routing::post(add_saving),
        )
        .route("/splits", axum::routing::post(create_split_group))
        .route("/splits/my-created", axum::routing::get(my_created_splits))
        .route(
            "/splits/my-participating",
            axum::routing::get(my_participating_splits),
        )
        .route("/splits/{group_id}", axum::routing::get(get_split_group))
        .route(
            "/splits/{group_id}/edit",
            axum::routing::put(edit_split_group),
        )
        .route(
            "/splits/{group_id}/complete",
            axum::routing::patch(complete_split_group),
        )
        .route("/integrity/drifts", axum::routing::get(drift_reports))
        .route("/integrity/audit", axum::routing::get(audit_balance))
        .route_layer(middleware::from_fn_with_state(
            service.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/auth/register", axum::routing::post(register))
        .route("/auth/login", axum::routing::post(login))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn register(
    State(service): State<Arc<AppService>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, token) = service
        .register(&req.name, &req.email, &req.password, req.phone)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(service): State<Arc<AppService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = service.login(&req.email, &req.password).await?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/profile/me",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_profile(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = service.get_profile(current.id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/api/profile/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn update_profile(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = service.update_profile(current.id, req.into()).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/expense/add",
    request_body = AddEntryRequest,
    responses(
        (status = 201, description = "Expense recorded", body = LedgerEntry),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn add_expense(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<LedgerEntry>), ApiError> {
    let entry = service
        .add_entry(current.id, EntryKind::Expense, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    post,
    path = "/api/income/add",
    request_body = AddEntryRequest,
    responses(
        (status = 201, description = "Income recorded", body = LedgerEntry),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn add_income(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<LedgerEntry>), ApiError> {
    let entry = service
        .add_entry(current.id, EntryKind::Income, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/transactions/edit/{kind}/{entry_id}",
    params(
        ("kind" = EntryKind, Path, description = "Entry kind, `expense` or `income`"),
        ("entry_id" = Uuid, Path, description = "Entry to edit")
    ),
    request_body = EditEntryRequest,
    responses(
        (status = 200, description = "Entry rewritten", body = LedgerEntry),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn edit_entry(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path((kind, entry_id)): Path<(EntryKind, Uuid)>,
    Json(req): Json<EditEntryRequest>,
) -> Result<Json<LedgerEntry>, ApiError> {
    let entry = service
        .edit_entry(current.id, kind, entry_id, req.into())
        .await?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/transactions/delete/{kind}/{entry_id}",
    params(
        ("kind" = EntryKind, Path, description = "Entry kind, `expense` or `income`"),
        ("entry_id" = Uuid, Path, description = "Entry to delete")
    ),
    responses(
        (status = 200, description = "Entry deleted; body is the removed record", body = LedgerEntry),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn delete_entry(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path((kind, entry_id)): Path<(EntryKind, Uuid)>,
) -> Result<Json<LedgerEntry>, ApiError> {
    let entry = service.delete_entry(current.id, kind, entry_id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/api/transactions/recent",
    responses(
        (status = 200, description = "Ten most recent entries, newest first", body = [LedgerEntry])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn recent_activity(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    Ok(Json(service.recent_activity(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/transactions/activity",
    responses(
        (status = 200, description = "Every entry, newest first", body = [LedgerEntry])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn full_activity(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    Ok(Json(service.full_activity(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/summary",
    responses(
        (status = 200, description = "Current month's totals", body = MonthSummaryView)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn current_summary(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MonthSummaryView>, ApiError> {
    Ok(Json(service.current_summary(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/summary/monthly",
    responses(
        (status = 200, description = "Balance plus every month's rollup", body = MonthlyLedgerView)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn monthly_ledger(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MonthlyLedgerView>, ApiError> {
    Ok(Json(service.monthly_ledger(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/summary/category",
    responses(
        (status = 200, description = "All-time expense totals per category", body = CategoryTotalsResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn category_totals(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<CategoryTotalsResponse>, ApiError> {
    let categories = service.category_totals(current.id).await?;
    Ok(Json(CategoryTotalsResponse { categories }))
}

#[utoipa::path(
    get,
    path = "/api/summary/trends",
    responses(
        (status = 200, description = "Month-by-month totals with the top spending category", body = [TrendPoint])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn monthly_trends(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<TrendPoint>>, ApiError> {
    Ok(Json(service.monthly_trends(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/goals",
    responses(
        (status = 200, description = "The user's goals, newest first", body = [Goal])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn list_goals(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Goal>>, ApiError> {
    Ok(Json(service.goals(current.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = Goal),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn create_goal(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    let goal = service
        .create_goal(current.id, &req.title, req.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

#[utoipa::path(
    get,
    path = "/api/goals/{goal_id}",
    params(("goal_id" = Uuid, Path, description = "Goal to fetch")),
    responses(
        (status = 200, description = "The goal", body = Goal),
        (status = 404, description = "Goal not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_goal(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Goal>, ApiError> {
    Ok(Json(service.goal(current.id, goal_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/goals/{goal_id}",
    params(("goal_id" = Uuid, Path, description = "Goal to update")),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = Goal),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn update_goal(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(goal_id): Path<Uuid>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<Goal>, ApiError> {
    let goal = service.update_goal(current.id, goal_id, req.into()).await?;
    Ok(Json(goal))
}

#[utoipa::path(
    delete,
    path = "/api/goals/{goal_id}",
    params(("goal_id" = Uuid, Path, description = "Goal to delete")),
    responses(
        (status = 200, description = "Goal deleted and contributions refunded", body = GoalDeletion),
        (status = 404, description = "Goal not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn delete_goal(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalDeletion>, ApiError> {
    Ok(Json(service.delete_goal(current.id, goal_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/goals/{goal_id}/add-saving",
    params(("goal_id" = Uuid, Path, description = "Goal to contribute to")),
    request_body = AddSavingRequest,
    responses(
        (status = 200, description = "Contribution recorded", body = ContributionOutcome),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn add_saving(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(goal_id): Path<Uuid>,
    Json(req): Json<AddSavingRequest>,
) -> Result<Json<ContributionOutcome>, ApiError> {
    let outcome = service.add_saving(current.id, goal_id, req.amount).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/splits",
    request_body = CreateSplitGroupRequest,
    responses(
        (status = 201, description = "Split group created", body = SplitGroup),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "A participant could not be resolved", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn create_split_group(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateSplitGroupRequest>,
) -> Result<(StatusCode, Json<SplitGroup>), ApiError> {
    let participants = req.participants.into_iter().map(Into::into).collect();
    let group = service
        .create_split_group(current.id, &req.title, &req.creator_upi, participants)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/splits/my-created",
    responses(
        (status = 200, description = "Groups the user created, newest first", body = [SplitGroup])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn my_created_splits(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<SplitGroup>>, ApiError> {
    Ok(Json(service.my_created_groups(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/splits/my-participating",
    responses(
        (status = 200, description = "Groups the user participates in but did not create", body = [SplitGroup])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn my_participating_splits(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<SplitGroup>>, ApiError> {
    Ok(Json(service.my_participating_groups(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/splits/{group_id}",
    params(("group_id" = Uuid, Path, description = "Group to fetch")),
    responses(
        (status = 200, description = "The group", body = SplitGroup),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_split_group(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<SplitGroup>, ApiError> {
    Ok(Json(service.split_group(current.id, group_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/splits/{group_id}/edit",
    params(("group_id" = Uuid, Path, description = "Group to edit")),
    request_body = EditSplitGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = SplitGroup),
        (status = 403, description = "Only the creator can edit", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn edit_split_group(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<EditSplitGroupRequest>,
) -> Result<Json<SplitGroup>, ApiError> {
    let group = service
        .edit_split_group(current.id, group_id, req.into())
        .await?;
    Ok(Json(group))
}

#[utoipa::path(
    patch,
    path = "/api/splits/{group_id}/complete",
    params(("group_id" = Uuid, Path, description = "Group to mark complete")),
    responses(
        (status = 200, description = "Completion state, idempotent", body = SplitCompletion),
        (status = 403, description = "Only the creator can mark complete", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn complete_split_group(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<SplitCompletion>, ApiError> {
    Ok(Json(service.complete_split_group(current.id, group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/integrity/drifts",
    responses(
        (status = 200, description = "Drift reports recorded for the user", body = [DriftReport])
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn drift_reports(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<DriftReport>>, ApiError> {
    Ok(Json(service.drift_reports(current.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/integrity/audit",
    responses(
        (status = 200, description = "Stored balance compared against a full replay", body = BalanceAudit)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn audit_balance(
    State(service): State<Arc<AppService>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<BalanceAudit>, ApiError> {
    Ok(Json(service.audit_balance(current.id).await?))
}
