use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::LedgerError;
use crate::core::models::adjustment::AdjustmentChanges;

#[derive(Deserialize, ToSchema)]
pub struct GenerateBalancesRequest {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAdjustmentRequest {
    pub user_id: String,
    pub adjustment_type: Option<String>,
    #[schema(value_type = Option<String>, example = "25.00")]
    pub adjustment_amount: Option<Decimal>,
    pub adjustment_reason: Option<String>,
    pub adjustment_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl UpdateAdjustmentRequest {
    pub fn into_parts(self) -> (String, AdjustmentChanges) {
        (
            self.user_id,
            AdjustmentChanges {
                adjustment_type: self.adjustment_type,
                adjustment_amount: self.adjustment_amount,
                adjustment_reason: self.adjustment_reason,
                adjustment_date: self.adjustment_date,
                status: self.status,
            },
        )
    }
}

#[derive(Deserialize, IntoParams)]
pub struct UserQuery {
    /// Caller; must own the adjustment
    pub user_id: String,
}

#[derive(Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    /// One of 10, 20, 50, 100
    pub size: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
pub struct DateRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Serialize, ToSchema)]
pub struct TotalResponse {
    #[schema(value_type = String, example = "40.00")]
    pub total: Decimal,
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

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::InvalidInput(..)
            | LedgerError::InvalidPageSize(_)
            | LedgerError::InvalidPeriod { .. }
            | LedgerError::AdjustmentExceedsExpense { .. }
            | LedgerError::TotalAdjustmentsExceedExpense { .. } => StatusCode::BAD_REQUEST,
            LedgerError::UserNotFound(_)
            | LedgerError::ExpenseNotFound(_)
            | LedgerError::AdjustmentNotFound(_)
            | LedgerError::BalanceNotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::NotOwner { .. } => StatusCode::FORBIDDEN,
            LedgerError::DuplicateMonthlyBalance { .. } => StatusCode::CONFLICT,
            LedgerError::StorageError(_)
            | LedgerError::LoggingError(_)
            | LedgerError::CacheError(_)
            | LedgerError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}
