//! Read-only aggregation over a user's expenses and incomes.

use crate::core::errors::LedgerError;
use crate::core::models::{expense::Expense, income::Income};
use crate::infrastructure::storage::TransactionLedger;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct LedgerQuery<'a, T: TransactionLedger + ?Sized> {
    ledger: &'a T,
}

impl<'a, T: TransactionLedger + ?Sized> LedgerQuery<'a, T> {
    pub fn new(ledger: &'a T) -> Self {
        LedgerQuery { ledger }
    }

    /// Total income dated within `[start, end]`. Missing amounts count as zero.
    pub async fn sum_income(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Decimal, LedgerError> {
        Ok(self
            .incomes_in_range(user_id, start, end)
            .await?
            .iter()
            .map(|i| i.amount.unwrap_or(Decimal::ZERO))
            .sum())
    }

    /// Total expenses dated within `[start, end]`. Missing amounts count as zero.
    pub async fn sum_expenses(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Decimal, LedgerError> {
        Ok(self
            .expenses_in_range(user_id, start, end)
            .await?
            .iter()
            .map(Expense::amount)
            .sum())
    }

    pub async fn expenses_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, LedgerError> {
        if start > end {
            return Ok(Vec::new());
        }
        let mut expenses = self.ledger.list_expenses_between(user_id, start, end).await?;
        expenses.sort_by(|a, b| a.expense_date.cmp(&b.expense_date).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    pub async fn incomes_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Income>, LedgerError> {
        if start > end {
            return Ok(Vec::new());
        }
        let mut incomes = self.ledger.list_incomes_between(user_id, start, end).await?;
        incomes.sort_by(|a, b| a.income_date.cmp(&b.income_date).then_with(|| a.id.cmp(&b.id)));
        Ok(incomes)
    }
}
