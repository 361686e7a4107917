pub mod cache_keys;
pub mod in_memory;

use crate::core::errors::LedgerError;
use crate::core::models::adjustment::ExpenseAdjustment;
use async_trait::async_trait;

/// Derived per-user lists, invalidated whenever that user's adjustments change.
///
/// Every invalidation bumps the user's generation. A list read from storage
/// is saved only under the generation observed before that read, so a
/// listing that overlaps a mutation cannot put the old list back.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_user_adjustments(&self, user_id: &str) -> Result<Option<Vec<ExpenseAdjustment>>, LedgerError>;
    async fn user_generation(&self, user_id: &str) -> Result<u64, LedgerError>;
    /// Stores the list unless the user's generation has moved past `generation`.
    async fn save_user_adjustments(
        &self,
        user_id: &str,
        adjustments: &[ExpenseAdjustment],
        ttl: std::time::Duration,
        generation: u64,
    ) -> Result<(), LedgerError>;
    async fn invalidate_user_adjustments(&self, user_id: &str) -> Result<(), LedgerError>;
}
