use crate::core::errors::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentType {
    Refund,
    Cashback,
    Reversal,
}

impl std::fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdjustmentType::Refund => "REFUND",
            AdjustmentType::Cashback => "CASHBACK",
            AdjustmentType::Reversal => "REVERSAL",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AdjustmentType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REFUND" => Ok(AdjustmentType::Refund),
            "CASHBACK" => Ok(AdjustmentType::Cashback),
            "REVERSAL" => Ok(AdjustmentType::Reversal),
            other => Err(LedgerError::invalid_input(
                "adjustment_type",
                "Invalid Adjustment Type",
                format!("`{}` is not one of REFUND, CASHBACK, REVERSAL", other),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdjustmentStatus::Pending => "PENDING",
            AdjustmentStatus::Completed => "COMPLETED",
            AdjustmentStatus::Failed => "FAILED",
            AdjustmentStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AdjustmentStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(AdjustmentStatus::Pending),
            "COMPLETED" => Ok(AdjustmentStatus::Completed),
            "FAILED" => Ok(AdjustmentStatus::Failed),
            "CANCELLED" => Ok(AdjustmentStatus::Cancelled),
            other => Err(LedgerError::invalid_input(
                "status",
                "Invalid Status",
                format!("`{}` is not one of PENDING, COMPLETED, FAILED, CANCELLED", other),
            )),
        }
    }
}

/// A refund, cashback or reversal recorded against an expense.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseAdjustment {
    pub id: String,
    pub expense_id: String,
    pub user_id: String,
    pub adjustment_type: AdjustmentType,
    pub adjustment_amount: Decimal,
    pub adjustment_reason: Option<String>,
    pub adjustment_date: NaiveDate,
    pub status: AdjustmentStatus,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ExpenseAdjustment {
    pub fn is_completed(&self) -> bool {
        self.status == AdjustmentStatus::Completed
    }
}

/// Raw create request. Type and status arrive as text and are parsed by the service.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewAdjustment {
    pub expense_id: String,
    pub user_id: String,
    pub adjustment_type: String,
    #[schema(value_type = String, example = "25.00")]
    pub adjustment_amount: Decimal,
    pub adjustment_reason: Option<String>,
    pub adjustment_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Partial update; only present fields are validated and applied.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct AdjustmentChanges {
    pub adjustment_type: Option<String>,
    #[schema(value_type = Option<String>, example = "25.00")]
    pub adjustment_amount: Option<Decimal>,
    pub adjustment_reason: Option<String>,
    pub adjustment_date: Option<NaiveDate>,
    pub status: Option<String>,
}
