use crate::core::errors::LedgerError;
use crate::core::models::{
    adjustment::ExpenseAdjustment, expense::Expense, income::Income, monthly_balance::MonthlyBalance, user::User,
};
use crate::infrastructure::storage::{AdjustmentStore, BalanceStore, TransactionLedger, UserDirectory};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type BalanceKey = (String, i32, u32);

#[derive(Clone)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    incomes: Arc<RwLock<HashMap<String, Income>>>,
    balances: Arc<RwLock<HashMap<BalanceKey, MonthlyBalance>>>,
    adjustments: Arc<RwLock<HashMap<String, ExpenseAdjustment>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Arc::new(RwLock::new(HashMap::new())),
            expenses: Arc::new(RwLock::new(HashMap::new())),
            incomes: Arc::new(RwLock::new(HashMap::new())),
            balances: Arc::new(RwLock::new(HashMap::new())),
            adjustments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Users, expenses and incomes are written by the surrounding system; these
    // let the server and tests populate them.

    pub async fn put_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn put_expense(&self, expense: Expense) {
        self.expenses.write().await.insert(expense.id.clone(), expense);
    }

    pub async fn put_income(&self, income: Income) {
        self.incomes.write().await.insert(income.id.clone(), income);
    }

    pub async fn set_expense_amount(&self, expense_id: &str, amount: Option<Decimal>) -> Result<(), LedgerError> {
        let mut expenses = self.expenses.write().await;
        let expense = expenses
            .get_mut(expense_id)
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))?;
        expense.expense_amount = amount;
        Ok(())
    }

    pub async fn monthly_balance_count(&self, user_id: &str) -> usize {
        self.balances
            .read()
            .await
            .keys()
            .filter(|(uid, _, _)| uid == user_id)
            .count()
    }
}

#[async_trait]
impl UserDirectory for InMemoryStorage {
    async fn user_exists(&self, user_id: &str) -> Result<bool, LedgerError> {
        Ok(self.users.read().await.contains_key(user_id))
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, LedgerError> {
        let mut ids: Vec<String> = self.users.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl TransactionLedger for InMemoryStorage {
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, LedgerError> {
        Ok(self.expenses.read().await.get(expense_id).cloned())
    }

    async fn list_expenses_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, LedgerError> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .values()
            .filter(|e| e.user_id == user_id && e.expense_date >= start && e.expense_date <= end)
            .cloned()
            .collect())
    }

    async fn list_incomes_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Income>, LedgerError> {
        let incomes = self.incomes.read().await;
        Ok(incomes
            .values()
            .filter(|i| i.user_id == user_id && i.income_date >= start && i.income_date <= end)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BalanceStore for InMemoryStorage {
    async fn find_monthly_balance(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyBalance>, LedgerError> {
        let balances = self.balances.read().await;
        Ok(balances.get(&(user_id.to_string(), year, month)).cloned())
    }

    async fn insert_monthly_balance(&self, balance: MonthlyBalance) -> Result<MonthlyBalance, LedgerError> {
        let mut balances = self.balances.write().await;
        let key = (balance.user_id.clone(), balance.year, balance.month);
        if balances.contains_key(&key) {
            return Err(LedgerError::DuplicateMonthlyBalance {
                user_id: balance.user_id,
                year: balance.year,
                month: balance.month,
            });
        }
        balances.insert(key, balance.clone());
        Ok(balance)
    }

    async fn list_monthly_balances(&self, user_id: &str) -> Result<Vec<MonthlyBalance>, LedgerError> {
        let balances = self.balances.read().await;
        let mut history: Vec<MonthlyBalance> = balances
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by_key(|b| b.period());
        Ok(history)
    }
}

#[async_trait]
impl AdjustmentStore for InMemoryStorage {
    async fn save_adjustment(&self, adjustment: ExpenseAdjustment) -> Result<ExpenseAdjustment, LedgerError> {
        let mut adjustments = self.adjustments.write().await;
        adjustments.insert(adjustment.id.clone(), adjustment.clone());
        Ok(adjustment)
    }

    async fn get_adjustment(&self, adjustment_id: &str) -> Result<Option<ExpenseAdjustment>, LedgerError> {
        Ok(self.adjustments.read().await.get(adjustment_id).cloned())
    }

    async fn delete_adjustment(&self, adjustment_id: &str) -> Result<(), LedgerError> {
        self.adjustments
            .write()
            .await
            .remove(adjustment_id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::AdjustmentNotFound(adjustment_id.to_string()))
    }

    async fn list_adjustments_by_expense(&self, expense_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError> {
        let adjustments = self.adjustments.read().await;
        Ok(adjustments
            .values()
            .filter(|a| a.expense_id == expense_id)
            .cloned()
            .collect())
    }

    async fn list_adjustments_by_user(&self, user_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError> {
        let adjustments = self.adjustments.read().await;
        Ok(adjustments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}
