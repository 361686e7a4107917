use crate::core::errors::LedgerError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only audit trail kept in process memory. Each entry is also echoed
/// to the `audit` log target.
#[derive(Clone, Default)]
pub struct InMemoryLogging {
    entries: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), LedgerError> {
        let entry = AppLog::new(action, details, user_id);
        info!(
            target: "audit",
            "{} user={} {}",
            entry.action,
            entry.user_id.as_deref().unwrap_or("-"),
            entry.details
        );
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, LedgerError> {
        Ok(self.entries.read().await.clone())
    }
}
