mod batch_tests;

use crate::core::balance::BalanceService;
use crate::core::models::{adjustment::NewAdjustment, expense::Expense, income::Income, user::User};
use crate::core::services::AdjustmentService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct TestServices {
    pub storage: InMemoryStorage,
    pub logging: InMemoryLogging,
    pub balances: BalanceService<InMemoryLogging, InMemoryStorage>,
    pub adjustments: AdjustmentService<InMemoryLogging, InMemoryStorage, InMemoryCache>,
}

pub fn create_test_services() -> TestServices {
    let _ = env_logger::try_init();
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();
    TestServices {
        balances: BalanceService::new(storage.clone(), logging.clone()).with_batch_concurrency(4),
        adjustments: AdjustmentService::new(storage.clone(), logging.clone(), cache),
        storage,
        logging,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn seed_user(storage: &InMemoryStorage, id: &str) {
    storage
        .put_user(User {
            id: id.to_string(),
            name: format!("User {}", id),
        })
        .await;
}

pub async fn seed_expense(storage: &InMemoryStorage, id: &str, user_id: &str, amount: Decimal, on: NaiveDate) {
    storage
        .put_expense(Expense {
            id: id.to_string(),
            user_id: user_id.to_string(),
            expense_amount: Some(amount),
            expense_date: on,
            description: None,
        })
        .await;
}

pub async fn seed_income(storage: &InMemoryStorage, id: &str, user_id: &str, amount: Decimal, on: NaiveDate) {
    storage
        .put_income(Income {
            id: id.to_string(),
            user_id: user_id.to_string(),
            amount: Some(amount),
            income_date: on,
            source: None,
        })
        .await;
}

pub fn new_adjustment(expense_id: &str, user_id: &str, amount: Decimal) -> NewAdjustment {
    NewAdjustment {
        expense_id: expense_id.to_string(),
        user_id: user_id.to_string(),
        adjustment_type: "REFUND".to_string(),
        adjustment_amount: amount,
        adjustment_reason: None,
        adjustment_date: Some(date(2024, 3, 10)),
        status: None,
    }
}

pub mod doubles {
    use crate::core::errors::LedgerError;
    use crate::core::models::{
        adjustment::ExpenseAdjustment, expense::Expense, income::Income, monthly_balance::MonthlyBalance,
    };
    use crate::infrastructure::cache::Cache;
    use crate::infrastructure::storage::in_memory::InMemoryStorage;
    use crate::infrastructure::storage::{AdjustmentStore, BalanceStore, TransactionLedger, UserDirectory};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Wraps the in-memory store to simulate a competing writer (the first
    /// `hidden_lookups` snapshot reads miss) and storage failures for chosen users.
    pub struct FlakyBalanceStore {
        pub inner: InMemoryStorage,
        pub hidden_lookups: AtomicUsize,
        pub failing_users: Vec<String>,
    }

    impl FlakyBalanceStore {
        pub fn new(inner: InMemoryStorage) -> Self {
            FlakyBalanceStore {
                inner,
                hidden_lookups: AtomicUsize::new(0),
                failing_users: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl UserDirectory for FlakyBalanceStore {
        async fn user_exists(&self, user_id: &str) -> Result<bool, LedgerError> {
            self.inner.user_exists(user_id).await
        }

        async fn list_user_ids(&self) -> Result<Vec<String>, LedgerError> {
            self.inner.list_user_ids().await
        }
    }

    #[async_trait]
    impl TransactionLedger for FlakyBalanceStore {
        async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, LedgerError> {
            self.inner.get_expense(expense_id).await
        }

        async fn list_expenses_between(
            &self,
            user_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Expense>, LedgerError> {
            self.inner.list_expenses_between(user_id, start, end).await
        }

        async fn list_incomes_between(
            &self,
            user_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Income>, LedgerError> {
            self.inner.list_incomes_between(user_id, start, end).await
        }
    }

    #[async_trait]
    impl BalanceStore for FlakyBalanceStore {
        async fn find_monthly_balance(
            &self,
            user_id: &str,
            year: i32,
            month: u32,
        ) -> Result<Option<MonthlyBalance>, LedgerError> {
            let hidden = self
                .hidden_lookups
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if hidden {
                return Ok(None);
            }
            self.inner.find_monthly_balance(user_id, year, month).await
        }

        async fn insert_monthly_balance(&self, balance: MonthlyBalance) -> Result<MonthlyBalance, LedgerError> {
            if self.failing_users.contains(&balance.user_id) {
                return Err(LedgerError::StorageError("connection reset".to_string()));
            }
            self.inner.insert_monthly_balance(balance).await
        }

        async fn list_monthly_balances(&self, user_id: &str) -> Result<Vec<MonthlyBalance>, LedgerError> {
            self.inner.list_monthly_balances(user_id).await
        }
    }

    /// Adjustment storage whose expense lookups and per-user listings can be
    /// slowed down, to widen the window between a read and the write after it.
    #[derive(Default)]
    pub struct SlowStorage {
        pub inner: InMemoryStorage,
        pub expense_delay_ms: AtomicU64,
        pub listing_delay_ms: AtomicU64,
    }

    impl SlowStorage {
        pub fn new(inner: InMemoryStorage) -> Self {
            SlowStorage {
                inner,
                ..Default::default()
            }
        }

        async fn pause(delay_ms: &AtomicU64) {
            let ms = delay_ms.load(Ordering::SeqCst);
            if ms > 0 {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
    }

    #[async_trait]
    impl UserDirectory for SlowStorage {
        async fn user_exists(&self, user_id: &str) -> Result<bool, LedgerError> {
            self.inner.user_exists(user_id).await
        }

        async fn list_user_ids(&self) -> Result<Vec<String>, LedgerError> {
            self.inner.list_user_ids().await
        }
    }

    #[async_trait]
    impl TransactionLedger for SlowStorage {
        async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, LedgerError> {
            let expense = self.inner.get_expense(expense_id).await;
            Self::pause(&self.expense_delay_ms).await;
            expense
        }

        async fn list_expenses_between(
            &self,
            user_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Expense>, LedgerError> {
            self.inner.list_expenses_between(user_id, start, end).await
        }

        async fn list_incomes_between(
            &self,
            user_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Income>, LedgerError> {
            self.inner.list_incomes_between(user_id, start, end).await
        }
    }

    #[async_trait]
    impl AdjustmentStore for SlowStorage {
        async fn save_adjustment(&self, adjustment: ExpenseAdjustment) -> Result<ExpenseAdjustment, LedgerError> {
            self.inner.save_adjustment(adjustment).await
        }

        async fn get_adjustment(&self, adjustment_id: &str) -> Result<Option<ExpenseAdjustment>, LedgerError> {
            self.inner.get_adjustment(adjustment_id).await
        }

        async fn delete_adjustment(&self, adjustment_id: &str) -> Result<(), LedgerError> {
            self.inner.delete_adjustment(adjustment_id).await
        }

        async fn list_adjustments_by_expense(&self, expense_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError> {
            self.inner.list_adjustments_by_expense(expense_id).await
        }

        async fn list_adjustments_by_user(&self, user_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError> {
            let adjustments = self.inner.list_adjustments_by_user(user_id).await;
            Self::pause(&self.listing_delay_ms).await;
            adjustments
        }
    }

    /// A cache that never holds anything and cannot be invalidated.
    pub struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get_user_adjustments(&self, _user_id: &str) -> Result<Option<Vec<ExpenseAdjustment>>, LedgerError> {
            Ok(None)
        }

        async fn user_generation(&self, _user_id: &str) -> Result<u64, LedgerError> {
            Ok(0)
        }

        async fn save_user_adjustments(
            &self,
            _user_id: &str,
            _adjustments: &[ExpenseAdjustment],
            _ttl: Duration,
            _generation: u64,
        ) -> Result<(), LedgerError> {
            Ok(())
        }

        async fn invalidate_user_adjustments(&self, _user_id: &str) -> Result<(), LedgerError> {
            Err(LedgerError::CacheError("cache unreachable".to_string()))
        }
    }
}
