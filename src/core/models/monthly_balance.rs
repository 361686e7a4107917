use crate::core::period::YearMonth;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Frozen balance snapshot for one user and calendar month.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlyBalance {
    pub id: String,
    pub user_id: String,
    pub year: i32,
    pub month: u32,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    #[schema(value_type = String, example = "2024-06-01T00:00:00Z")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MonthlyBalance {
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}
