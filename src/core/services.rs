use crate::core::constants::{ADJUSTMENT_CREATED, ADJUSTMENT_DELETED, ADJUSTMENT_UPDATED};
use crate::core::errors::LedgerError;
use crate::core::models::{
    adjustment::{AdjustmentChanges, AdjustmentStatus, AdjustmentType, ExpenseAdjustment, NewAdjustment},
    audit::AppLog,
    expense::Expense,
    page::{Page, PageRequest},
};
use crate::core::period::YearMonth;
use crate::core::validation::{
    validate_adjustment_amount, validate_adjustment_date, validate_reason,
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::locks::ExpenseLocks;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{AdjustmentStore, TransactionLedger, UserDirectory};
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Create, update, delete and read adjustments while keeping each expense's
/// adjustment total within its amount.
pub struct AdjustmentService<L, S, C>
where
    L: LoggingService,
    S: UserDirectory + TransactionLedger + AdjustmentStore,
    C: Cache,
{
    storage: S,
    logging: L,
    cache: C,
    locks: ExpenseLocks,
    cache_ttl: Duration,
}

impl<L, S, C> AdjustmentService<L, S, C>
where
    L: LoggingService,
    S: UserDirectory + TransactionLedger + AdjustmentStore,
    C: Cache,
{
    pub fn new(storage: S, logging: L, cache: C) -> Self {
        AdjustmentService {
            storage,
            logging,
            cache,
            locks: ExpenseLocks::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    async fn validate_user(&self, user_id: &str) -> Result<(), LedgerError> {
        if !self.storage.user_exists(user_id).await? {
            return Err(LedgerError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn validate_expense_owner(&self, expense_id: &str, user_id: &str) -> Result<Expense, LedgerError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))?;
        if !expense.is_owned_by(user_id) {
            warn!("User {} attempted to access expense {} owned by {}", user_id, expense_id, expense.user_id);
            return Err(LedgerError::NotOwner {
                user_id: user_id.to_string(),
                resource: format!("expense {}", expense_id),
            });
        }
        Ok(expense)
    }

    async fn owned_adjustment(&self, adjustment_id: &str, user_id: &str) -> Result<ExpenseAdjustment, LedgerError> {
        let adjustment = self
            .storage
            .get_adjustment(adjustment_id)
            .await?
            .ok_or_else(|| LedgerError::AdjustmentNotFound(adjustment_id.to_string()))?;
        if adjustment.user_id != user_id {
            warn!(
                "User {} attempted to access adjustment {} owned by {}",
                user_id, adjustment_id, adjustment.user_id
            );
            return Err(LedgerError::NotOwner {
                user_id: user_id.to_string(),
                resource: format!("adjustment {}", adjustment_id),
            });
        }
        Ok(adjustment)
    }

    /// Runs after a committed write; failures here are logged, not returned,
    /// since the write already happened.
    async fn after_mutation(&self, user_id: &str, action: &str, details: serde_json::Value) {
        if let Err(e) = self.cache.invalidate_user_adjustments(user_id).await {
            warn!("Failed to invalidate adjustment cache for user {}: {}", user_id, e);
        }
        if let Err(e) = self.logging.log_action(action, details, Some(user_id)).await {
            warn!("Failed to record {} for user {}: {}", action, user_id, e);
        }
    }

    pub async fn create_adjustment(&self, request: NewAdjustment) -> Result<ExpenseAdjustment, LedgerError> {
        info!("Creating adjustment on expense {} for user {}", request.expense_id, request.user_id);
        self.validate_user(&request.user_id).await?;
        self.validate_expense_owner(&request.expense_id, &request.user_id).await?;

        let adjustment_type: AdjustmentType = request.adjustment_type.parse()?;
        let status = match request.status.as_deref() {
            Some(s) => s.parse()?,
            None => AdjustmentStatus::default(),
        };
        let adjustment_date = request.adjustment_date.unwrap_or_else(|| Utc::now().date_naive());
        validate_adjustment_date(adjustment_date)?;
        if let Some(reason) = &request.adjustment_reason {
            validate_reason(reason)?;
        }

        let _guard = self.locks.acquire(&request.expense_id).await;
        // reload under the lock; the amount may have changed since the ownership check
        let expense = self.validate_expense_owner(&request.expense_id, &request.user_id).await?;
        let siblings = self.storage.list_adjustments_by_expense(&expense.id).await?;
        validate_adjustment_amount(&expense, request.adjustment_amount, &siblings, None)?;

        let now = Utc::now();
        let adjustment = ExpenseAdjustment {
            id: Uuid::new_v4().to_string(),
            expense_id: expense.id.clone(),
            user_id: request.user_id.clone(),
            adjustment_type,
            adjustment_amount: request.adjustment_amount,
            adjustment_reason: request.adjustment_reason,
            adjustment_date,
            status,
            created_at: now,
            updated_at: now,
        };
        let saved = self.storage.save_adjustment(adjustment).await?;
        debug!("Adjustment {} saved", saved.id);

        self.after_mutation(
            &saved.user_id,
            ADJUSTMENT_CREATED,
            json!({
                "adjustment_id": saved.id,
                "expense_id": saved.expense_id,
                "adjustment_type": saved.adjustment_type,
                "adjustment_amount": saved.adjustment_amount,
                "status": saved.status,
            }),
        )
        .await;

        Ok(saved)
    }

    pub async fn update_adjustment(
        &self,
        adjustment_id: &str,
        user_id: &str,
        changes: AdjustmentChanges,
    ) -> Result<ExpenseAdjustment, LedgerError> {
        info!("Updating adjustment {} for user {}", adjustment_id, user_id);
        let current = self.owned_adjustment(adjustment_id, user_id).await?;

        let _guard = self.locks.acquire(&current.expense_id).await;
        let mut adjustment = self.owned_adjustment(adjustment_id, user_id).await?;
        let expense = self
            .storage
            .get_expense(&adjustment.expense_id)
            .await?
            .ok_or_else(|| LedgerError::ExpenseNotFound(adjustment.expense_id.clone()))?;

        if let Some(adjustment_type) = &changes.adjustment_type {
            adjustment.adjustment_type = adjustment_type.parse()?;
        }
        if let Some(amount) = changes.adjustment_amount {
            let siblings = self.storage.list_adjustments_by_expense(&expense.id).await?;
            validate_adjustment_amount(&expense, amount, &siblings, Some(adjustment_id))?;
            adjustment.adjustment_amount = amount;
        }
        if let Some(reason) = changes.adjustment_reason {
            validate_reason(&reason)?;
            adjustment.adjustment_reason = Some(reason);
        }
        if let Some(date) = changes.adjustment_date {
            validate_adjustment_date(date)?;
            adjustment.adjustment_date = date;
        }
        if let Some(status) = &changes.status {
            // any member of the enumeration may be set directly
            adjustment.status = status.parse()?;
        }
        adjustment.updated_at = Utc::now();

        let saved = self.storage.save_adjustment(adjustment).await?;
        self.after_mutation(
            user_id,
            ADJUSTMENT_UPDATED,
            json!({
                "adjustment_id": saved.id,
                "expense_id": saved.expense_id,
                "adjustment_amount": saved.adjustment_amount,
                "status": saved.status,
            }),
        )
        .await;

        Ok(saved)
    }

    pub async fn delete_adjustment(&self, user_id: &str, adjustment_id: &str) -> Result<(), LedgerError> {
        info!("Deleting adjustment {} for user {}", adjustment_id, user_id);
        let current = self.owned_adjustment(adjustment_id, user_id).await?;

        // an in-flight update on the same expense must not re-save the row afterwards
        let _guard = self.locks.acquire(&current.expense_id).await;
        let adjustment = self.owned_adjustment(adjustment_id, user_id).await?;
        self.storage.delete_adjustment(adjustment_id).await?;
        self.after_mutation(
            user_id,
            ADJUSTMENT_DELETED,
            json!({ "adjustment_id": adjustment.id, "expense_id": adjustment.expense_id }),
        )
        .await;
        Ok(())
    }

    pub async fn get_adjustment(&self, user_id: &str, adjustment_id: &str) -> Result<ExpenseAdjustment, LedgerError> {
        self.owned_adjustment(adjustment_id, user_id).await
    }

    pub async fn list_adjustments_by_expense(
        &self,
        user_id: &str,
        expense_id: &str,
    ) -> Result<Vec<ExpenseAdjustment>, LedgerError> {
        self.validate_user(user_id).await?;
        self.validate_expense_owner(expense_id, user_id).await?;
        let mut adjustments: Vec<ExpenseAdjustment> = self
            .storage
            .list_adjustments_by_expense(expense_id)
            .await?
            .into_iter()
            .filter(|a| a.user_id == user_id)
            .collect();
        sort_newest_first(&mut adjustments);
        Ok(adjustments)
    }

    pub async fn list_adjustments_by_user(
        &self,
        user_id: &str,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<Page<ExpenseAdjustment>, LedgerError> {
        let request = PageRequest::new(page, size)?;
        self.validate_user(user_id).await?;
        let adjustments = self.user_adjustments(user_id).await?;
        Ok(Page::from_sorted(&adjustments, request))
    }

    pub async fn list_adjustments_by_date_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<Page<ExpenseAdjustment>, LedgerError> {
        let request = PageRequest::new(page, size)?;
        if start > end {
            return Err(LedgerError::invalid_input(
                "start",
                "Invalid Date Range",
                "start must not be after end",
            ));
        }
        self.validate_user(user_id).await?;
        let in_range: Vec<ExpenseAdjustment> = self
            .user_adjustments(user_id)
            .await?
            .into_iter()
            .filter(|a| a.adjustment_date >= start && a.adjustment_date <= end)
            .collect();
        Ok(Page::from_sorted(&in_range, request))
    }

    /// Sum of COMPLETED adjustments on an expense.
    pub async fn total_completed_adjustment_for_expense(&self, expense_id: &str) -> Result<Decimal, LedgerError> {
        Ok(self
            .storage
            .list_adjustments_by_expense(expense_id)
            .await?
            .iter()
            .filter(|a| a.is_completed())
            .map(|a| a.adjustment_amount)
            .sum())
    }

    /// Sum of a user's COMPLETED adjustments dated within the month.
    pub async fn total_completed_adjustments_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Decimal, LedgerError> {
        let period = YearMonth::new(year, month)?;
        self.validate_user(user_id).await?;
        Ok(self
            .user_adjustments(user_id)
            .await?
            .iter()
            .filter(|a| a.is_completed() && period.contains(a.adjustment_date))
            .map(|a| a.adjustment_amount)
            .sum())
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, LedgerError> {
        self.logging.get_logs().await
    }

    async fn user_adjustments(&self, user_id: &str) -> Result<Vec<ExpenseAdjustment>, LedgerError> {
        if let Some(cached) = self.cache.get_user_adjustments(user_id).await? {
            return Ok(cached);
        }
        // observed before the storage read; a mutation in between makes the save a no-op
        let generation = self.cache.user_generation(user_id).await?;
        let mut adjustments = self.storage.list_adjustments_by_user(user_id).await?;
        sort_newest_first(&mut adjustments);
        self.cache
            .save_user_adjustments(user_id, &adjustments, self.cache_ttl, generation)
            .await?;
        Ok(adjustments)
    }
}

fn sort_newest_first(adjustments: &mut [ExpenseAdjustment]) {
    adjustments.sort_by(|a, b| {
        b.adjustment_date
            .cmp(&a.adjustment_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
