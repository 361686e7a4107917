use crate::core::errors::LedgerError;
use crate::core::models::{
    adjustment::ExpenseAdjustment, expense::Expense, income::Income, monthly_balance::MonthlyBalance,
};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: &str) -> Result<bool, LedgerError>;
    async fn list_user_ids(&self) -> Result<Vec<String>, LedgerError>;
}

/// Expense and income records owned by the surrounding system.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, LedgerError>;
    /// Expenses dated within `[start, end]`, inclusive.
    async fn list_expenses_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, LedgerError>;
    /// Incomes dated within `[start, end]`, inclusive.
    async fn list_incomes_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Income>, LedgerError>;
}

#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn find_monthly_balance(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyBalance>, LedgerError>;
    /// Inserts a new snapshot. Fails with `DuplicateMonthlyBalance` when a row
    /// for the same (user, year, month) already exists.
    async fn insert_monthly_balance(&self, balance: MonthlyBalance) -> Result<MonthlyBalance, LedgerError>;
    async fn list_monthly_balances(&self, user_id: &str) -> Result<Vec<MonthlyBalance>, LedgerError>;
}

#[async_trait]
pub trait AdjustmentStore: Send + Sync {
    async fn save_adjustment(&self, adjustment: ExpenseAdjustment) -> Result<ExpenseAdjustment, LedgerError>;
    async fn get_adjustment(&self, adjustment_id: &str) -> Result<Option<ExpenseAdjustment>, LedgerError>;
    async fn delete_adjustment(&self, adjustment_id: &str) -> Result<(), LedgerError>;
    async fn list_adjustments_by_expense(&self, expense_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError>;
    async fn list_adjustments_by_user(&self, user_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError>;
}

pub mod in_memory;
