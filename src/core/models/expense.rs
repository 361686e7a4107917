use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An expense recorded by the surrounding system. Read-only here apart from
/// the amount, which may change after adjustments were validated against it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub expense_amount: Option<Decimal>,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
}

impl Expense {
    /// The amount adjustments are capped against; a missing amount caps at zero.
    pub fn amount(&self) -> Decimal {
        self.expense_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
