use crate::{
    api::models::*,
    core::{
        balance::{BalanceService, BatchReport},
        models::{
            adjustment::{ExpenseAdjustment, NewAdjustment},
            audit::AppLog,
            monthly_balance::MonthlyBalance,
            page::Page,
        },
        services::AdjustmentService,
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use std::sync::Arc;

pub type AppBalanceService = BalanceService<InMemoryLogging, InMemoryStorage>;
pub type AppAdjustmentService = AdjustmentService<InMemoryLogging, InMemoryStorage, InMemoryCache>;

#[derive(Clone)]
pub struct AppState {
    pub balances: Arc<AppBalanceService>,
    pub adjustments: Arc<AppAdjustmentService>,
}

// Define API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/balances/generate", post(generate_monthly_balances))
        .route("/users/{user_id}/balances", get(get_balance_history))
        .route("/users/{user_id}/balances/previous", get(get_previous_month_balance))
        .route("/adjustments", post(create_adjustment))
        .route(
            "/adjustments/{adjustment_id}",
            get(get_adjustment).put(update_adjustment).delete(delete_adjustment),
        )
        .route("/users/{user_id}/adjustments", get(list_adjustments_by_user))
        .route("/users/{user_id}/adjustments/range", get(list_adjustments_by_date_range))
        .route(
            "/users/{user_id}/adjustments/completed-total",
            get(total_completed_adjustments_for_month),
        )
        .route(
            "/users/{user_id}/expenses/{expense_id}/adjustments",
            get(list_adjustments_by_expense),
        )
        .route(
            "/expenses/{expense_id}/adjustments/completed-total",
            get(total_completed_adjustment_for_expense),
        )
        .route("/logs", get(get_app_logs))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/balances/generate",
    request_body = GenerateBalancesRequest,
    responses(
        (status = 200, description = "Balances generated; per-user failures listed in the report", body = BatchReport),
        (status = 400, description = "Invalid period", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn generate_monthly_balances(
    State(state): State<AppState>,
    Json(req): Json<GenerateBalancesRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    let report = state
        .balances
        .generate_monthly_balances(req.year, req.month, Utc::now().date_naive())
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/balances/previous",
    params(
        ("user_id" = String, Path, description = "ID of the user")
    ),
    responses(
        (status = 200, description = "Balance for the previous calendar month", body = MonthlyBalance),
        (status = 404, description = "User or balance not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_previous_month_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MonthlyBalance>, ApiError> {
    let balance = state
        .balances
        .get_previous_month_balance(&user_id, Utc::now().date_naive())
        .await?;
    Ok(Json(balance))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/balances",
    params(
        ("user_id" = String, Path, description = "ID of the user")
    ),
    responses(
        (status = 200, description = "All snapshots in chronological order", body = Vec<MonthlyBalance>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_balance_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MonthlyBalance>>, ApiError> {
    Ok(Json(state.balances.balance_history(&user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/adjustments",
    request_body = NewAdjustment,
    responses(
        (status = 201, description = "Adjustment created", body = ExpenseAdjustment),
        (status = 400, description = "Invalid input or amount exceeds expense", body = ErrorResponse),
        (status = 403, description = "Expense not owned by user", body = ErrorResponse),
        (status = 404, description = "User or expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_adjustment(
    State(state): State<AppState>,
    Json(req): Json<NewAdjustment>,
) -> Result<(StatusCode, Json<ExpenseAdjustment>), ApiError> {
    let adjustment = state.adjustments.create_adjustment(req).await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

#[utoipa::path(
    put,
    path = "/api/adjustments/{adjustment_id}",
    request_body = UpdateAdjustmentRequest,
    params(
        ("adjustment_id" = String, Path, description = "ID of the adjustment")
    ),
    responses(
        (status = 200, description = "Adjustment updated", body = ExpenseAdjustment),
        (status = 400, description = "Invalid input or amount exceeds expense", body = ErrorResponse),
        (status = 403, description = "Adjustment not owned by user", body = ErrorResponse),
        (status = 404, description = "Adjustment or expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn update_adjustment(
    State(state): State<AppState>,
    Path(adjustment_id): Path<String>,
    Json(req): Json<UpdateAdjustmentRequest>,
) -> Result<Json<ExpenseAdjustment>, ApiError> {
    let (user_id, changes) = req.into_parts();
    let adjustment = state
        .adjustments
        .update_adjustment(&adjustment_id, &user_id, changes)
        .await?;
    Ok(Json(adjustment))
}

#[utoipa::path(
    delete,
    path = "/api/adjustments/{adjustment_id}",
    params(
        ("adjustment_id" = String, Path, description = "ID of the adjustment"),
        UserQuery
    ),
    responses(
        (status = 204, description = "Adjustment deleted"),
        (status = 403, description = "Adjustment not owned by user", body = ErrorResponse),
        (status = 404, description = "Adjustment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn delete_adjustment(
    State(state): State<AppState>,
    Path(adjustment_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    state
        .adjustments
        .delete_adjustment(&query.user_id, &adjustment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/adjustments/{adjustment_id}",
    params(
        ("adjustment_id" = String, Path, description = "ID of the adjustment"),
        UserQuery
    ),
    responses(
        (status = 200, description = "Adjustment retrieved", body = ExpenseAdjustment),
        (status = 403, description = "Adjustment not owned by user", body = ErrorResponse),
        (status = 404, description = "Adjustment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_adjustment(
    State(state): State<AppState>,
    Path(adjustment_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ExpenseAdjustment>, ApiError> {
    let adjustment = state
        .adjustments
        .get_adjustment(&query.user_id, &adjustment_id)
        .await?;
    Ok(Json(adjustment))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/adjustments",
    params(
        ("user_id" = String, Path, description = "ID of the user"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of adjustments, newest first", body = Page<ExpenseAdjustment>),
        (status = 400, description = "Invalid page size", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_adjustments_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ExpenseAdjustment>>, ApiError> {
    let page = state
        .adjustments
        .list_adjustments_by_user(&user_id, query.page, query.size)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/adjustments/range",
    params(
        ("user_id" = String, Path, description = "ID of the user"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Page of adjustments dated within the range", body = Page<ExpenseAdjustment>),
        (status = 400, description = "Invalid range or page size", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_adjustments_by_date_range(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Page<ExpenseAdjustment>>, ApiError> {
    let page = state
        .adjustments
        .list_adjustments_by_date_range(&user_id, query.start, query.end, query.page, query.size)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/expenses/{expense_id}/adjustments",
    params(
        ("user_id" = String, Path, description = "ID of the user"),
        ("expense_id" = String, Path, description = "ID of the expense")
    ),
    responses(
        (status = 200, description = "Adjustments on the expense", body = Vec<ExpenseAdjustment>),
        (status = 403, description = "Expense not owned by user", body = ErrorResponse),
        (status = 404, description = "User or expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_adjustments_by_expense(
    State(state): State<AppState>,
    Path((user_id, expense_id)): Path<(String, String)>,
) -> Result<Json<Vec<ExpenseAdjustment>>, ApiError> {
    let adjustments = state
        .adjustments
        .list_adjustments_by_expense(&user_id, &expense_id)
        .await?;
    Ok(Json(adjustments))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{expense_id}/adjustments/completed-total",
    params(
        ("expense_id" = String, Path, description = "ID of the expense")
    ),
    responses(
        (status = 200, description = "Sum of completed adjustments", body = TotalResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn total_completed_adjustment_for_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> Result<Json<TotalResponse>, ApiError> {
    let total = state
        .adjustments
        .total_completed_adjustment_for_expense(&expense_id)
        .await?;
    Ok(Json(TotalResponse { total }))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/adjustments/completed-total",
    params(
        ("user_id" = String, Path, description = "ID of the user"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Sum of completed adjustments dated in the month", body = TotalResponse),
        (status = 400, description = "Invalid period", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn total_completed_adjustments_for_month(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<TotalResponse>, ApiError> {
    let total = state
        .adjustments
        .total_completed_adjustments_for_month(&user_id, query.year, query.month)
        .await?;
    Ok(Json(TotalResponse { total }))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Audit log", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_app_logs(State(state): State<AppState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(state.adjustments.get_app_logs().await?))
}
