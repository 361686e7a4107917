use crate::core::constants::MONTHLY_BALANCES_GENERATED;
use crate::core::errors::LedgerError;
use crate::core::ledger::LedgerQuery;
use crate::core::models::monthly_balance::MonthlyBalance;
use crate::core::period::YearMonth;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{BalanceStore, TransactionLedger, UserDirectory};
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BatchFailure {
    pub user_id: String,
    pub error: String,
}

/// Outcome of one batch run. Failed users do not affect the others.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BatchReport {
    pub period: YearMonth,
    pub total_users: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

pub struct BalanceService<L, S>
where
    L: LoggingService,
    S: UserDirectory + TransactionLedger + BalanceStore,
{
    storage: S,
    logging: L,
    batch_concurrency: usize,
}

impl<L, S> BalanceService<L, S>
where
    L: LoggingService,
    S: UserDirectory + TransactionLedger + BalanceStore,
{
    pub fn new(storage: S, logging: L) -> Self {
        BalanceService {
            storage,
            logging,
            batch_concurrency: 1,
        }
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Computes and freezes the snapshot for one user and month.
    ///
    /// An existing snapshot is returned untouched. Otherwise the opening
    /// balance is the previous month's closing balance, or zero when that
    /// month has no snapshot; earlier months are not consulted. If another
    /// writer inserts the same period first, its row is returned.
    pub async fn generate_snapshot(&self, user_id: &str, target: YearMonth) -> Result<MonthlyBalance, LedgerError> {
        if let Some(existing) = self
            .storage
            .find_monthly_balance(user_id, target.year, target.month)
            .await?
        {
            debug!("Balance for {} in {} already exists", user_id, target);
            return Ok(existing);
        }

        let prior = target.previous();
        let opening = match self.storage.find_monthly_balance(user_id, prior.year, prior.month).await? {
            Some(previous) => previous.closing_balance,
            None => {
                debug!("No balance for {} in {}, opening at zero", user_id, prior);
                Decimal::ZERO
            }
        };

        let ledger = LedgerQuery::new(&self.storage);
        let income = ledger.sum_income(user_id, target.first_day(), target.last_day()).await?;
        let expenses = ledger.sum_expenses(user_id, target.first_day(), target.last_day()).await?;
        let closing = opening + income - expenses;

        let snapshot = MonthlyBalance {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            year: target.year,
            month: target.month,
            opening_balance: opening,
            closing_balance: closing,
            created_at: Utc::now(),
        };

        match self.storage.insert_monthly_balance(snapshot).await {
            Ok(saved) => {
                info!(
                    "Generated balance for {} in {}: opening {} closing {}",
                    user_id, target, saved.opening_balance, saved.closing_balance
                );
                Ok(saved)
            }
            Err(LedgerError::DuplicateMonthlyBalance { .. }) => {
                warn!("Lost race generating balance for {} in {}, re-reading", user_id, target);
                self.storage
                    .find_monthly_balance(user_id, target.year, target.month)
                    .await?
                    .ok_or(LedgerError::DuplicateMonthlyBalance {
                        user_id: user_id.to_string(),
                        year: target.year,
                        month: target.month,
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Generates `target` for every known user. Per-user failures are logged
    /// and reported; they never abort the batch.
    pub async fn generate_for_all_users(&self, target: YearMonth) -> Result<BatchReport, LedgerError> {
        let user_ids = self.storage.list_user_ids().await?;
        info!("Generating balances for {} users for {}", user_ids.len(), target);

        let results: Vec<(String, Result<MonthlyBalance, LedgerError>)> = stream::iter(user_ids.clone())
            .map(|user_id: String| async move {
                let result = self.generate_snapshot(&user_id, target).await;
                (user_id, result)
            })
            .buffer_unordered(self.batch_concurrency)
            .collect()
            .await;

        let mut failures = Vec::new();
        for (user_id, result) in results {
            if let Err(e) = result {
                error!("Failed to generate balance for {} in {}: {}", user_id, target, e);
                failures.push(BatchFailure {
                    user_id,
                    error: e.to_string(),
                });
            }
        }
        failures.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let report = BatchReport {
            period: target,
            total_users: user_ids.len(),
            succeeded: user_ids.len() - failures.len(),
            failures,
        };
        info!(
            "Balance batch for {} finished: {} succeeded, {} failed",
            target,
            report.succeeded,
            report.failures.len()
        );

        self.logging
            .log_action(
                MONTHLY_BALANCES_GENERATED,
                json!({
                    "year": target.year,
                    "month": target.month,
                    "total_users": report.total_users,
                    "succeeded": report.succeeded,
                    "failed": report.failures.len(),
                }),
                None,
            )
            .await?;

        Ok(report)
    }

    /// Administrative trigger. Uses `(year, month)` when both are given and
    /// the month before `today` when neither is. A lone year or month is
    /// rejected.
    pub async fn generate_monthly_balances(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<BatchReport, LedgerError> {
        let target = match (year, month) {
            (Some(year), Some(month)) => YearMonth::new(year, month)?,
            (None, None) => YearMonth::containing(today).previous(),
            (Some(_), None) => {
                return Err(LedgerError::invalid_input(
                    "month",
                    "Incomplete Period",
                    "month is required when year is given",
                ));
            }
            (None, Some(_)) => {
                return Err(LedgerError::invalid_input(
                    "year",
                    "Incomplete Period",
                    "year is required when month is given",
                ));
            }
        };
        self.generate_for_all_users(target).await
    }

    pub async fn get_previous_month_balance(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<MonthlyBalance, LedgerError> {
        self.ensure_user(user_id).await?;
        let previous = YearMonth::containing(today).previous();
        self.storage
            .find_monthly_balance(user_id, previous.year, previous.month)
            .await?
            .ok_or(LedgerError::BalanceNotFound {
                user_id: user_id.to_string(),
                year: previous.year,
                month: previous.month,
            })
    }

    pub async fn balance_history(&self, user_id: &str) -> Result<Vec<MonthlyBalance>, LedgerError> {
        self.ensure_user(user_id).await?;
        self.storage.list_monthly_balances(user_id).await
    }

    async fn ensure_user(&self, user_id: &str) -> Result<(), LedgerError> {
        if !self.storage.user_exists(user_id).await? {
            return Err(LedgerError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }
}
