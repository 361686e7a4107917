use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Income {
    pub id: String,
    pub user_id: String,
    pub amount: Option<Decimal>,
    pub income_date: NaiveDate,
    pub source: Option<String>,
}
