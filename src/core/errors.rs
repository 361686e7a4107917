use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Invalid page size {0}; allowed sizes are 10, 20, 50 and 100")]
    InvalidPageSize(u32),
    #[error("Invalid period {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(String),
    #[error("Adjustment {0} not found")]
    AdjustmentNotFound(String),
    #[error("No balance for user {user_id} in {year}-{month:02}")]
    BalanceNotFound { user_id: String, year: i32, month: u32 },
    #[error("User {user_id} does not own {resource}")]
    NotOwner { user_id: String, resource: String },
    #[error("Adjustment amount {amount} exceeds expense amount {expense_amount}")]
    AdjustmentExceedsExpense { amount: Decimal, expense_amount: Decimal },
    #[error(
        "Total adjustments exceed expense amount: existing {existing_total} + new {new_amount} = {total}, limit {limit}"
    )]
    TotalAdjustmentsExceedExpense {
        existing_total: Decimal,
        new_amount: Decimal,
        total: Decimal,
        limit: Decimal,
    },
    #[error("Balance for user {user_id} in {year}-{month:02} already exists")]
    DuplicateMonthlyBalance { user_id: String, year: i32, month: u32 },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl LedgerError {
    pub fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        LedgerError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }
}
