pub mod in_memory;

use crate::core::errors::LedgerError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Audit trail for state-changing operations.
#[async_trait]
pub trait LoggingService: Send + Sync {
    /// Records `action`; `user_id` is `None` for system-initiated work.
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), LedgerError>;
    /// All entries, oldest first.
    async fn get_logs(&self) -> Result<Vec<AppLog>, LedgerError>;
}
