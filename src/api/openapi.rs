use utoipa::OpenApi;

use crate::{
    api::models::{ErrorResponse, GenerateBalancesRequest, TotalResponse, UpdateAdjustmentRequest},
    core::{
        balance::{BatchFailure, BatchReport},
        models::{
            adjustment::{AdjustmentStatus, AdjustmentType, ExpenseAdjustment, NewAdjustment},
            audit::AppLog,
            monthly_balance::MonthlyBalance,
        },
        period::YearMonth,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::generate_monthly_balances,
        super::handlers::get_previous_month_balance,
        super::handlers::get_balance_history,
        super::handlers::create_adjustment,
        super::handlers::update_adjustment,
        super::handlers::delete_adjustment,
        super::handlers::get_adjustment,
        super::handlers::list_adjustments_by_user,
        super::handlers::list_adjustments_by_date_range,
        super::handlers::list_adjustments_by_expense,
        super::handlers::total_completed_adjustment_for_expense,
        super::handlers::total_completed_adjustments_for_month,
        super::handlers::get_app_logs
    ),
    components(schemas(
        GenerateBalancesRequest,
        UpdateAdjustmentRequest,
        NewAdjustment,
        TotalResponse,
        ErrorResponse,
        MonthlyBalance,
        BatchReport,
        BatchFailure,
        YearMonth,
        ExpenseAdjustment,
        AdjustmentType,
        AdjustmentStatus,
        AppLog
    )),
    info(
        title = "Ledgerkeep API",
        description = "Monthly balance snapshots and expense adjustment reconciliation",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
