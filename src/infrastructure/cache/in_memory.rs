use crate::core::errors::LedgerError;
use crate::core::models::adjustment::ExpenseAdjustment;
use crate::infrastructure::cache::{Cache, cache_keys::user_adjustments_key};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct UserSlot {
    generation: u64,
    entry: Option<(Vec<ExpenseAdjustment>, DateTime<Utc>)>,
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    slots: Arc<RwLock<HashMap<String, UserSlot>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_user_adjustments(&self, user_id: &str) -> Result<Option<Vec<ExpenseAdjustment>>, LedgerError> {
        let key = user_adjustments_key(user_id);
        {
            let slots = self.slots.read().await;
            match slots.get(&key).and_then(|slot| slot.entry.as_ref()) {
                Some((adjustments, expiry)) if *expiry > Utc::now() => return Ok(Some(adjustments.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // expired; a fresher save may have landed since the read lock was released
        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.get_mut(&key) {
            if matches!(&slot.entry, Some((_, expiry)) if *expiry <= Utc::now()) {
                slot.entry = None;
            }
        }
        Ok(None)
    }

    async fn user_generation(&self, user_id: &str) -> Result<u64, LedgerError> {
        let slots = self.slots.read().await;
        Ok(slots
            .get(&user_adjustments_key(user_id))
            .map_or(0, |slot| slot.generation))
    }

    async fn save_user_adjustments(
        &self,
        user_id: &str,
        adjustments: &[ExpenseAdjustment],
        ttl: std::time::Duration,
        generation: u64,
    ) -> Result<(), LedgerError> {
        let expiry = Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| LedgerError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let mut slots = self.slots.write().await;
        let slot = slots.entry(user_adjustments_key(user_id)).or_default();
        if slot.generation != generation {
            log::debug!("Skipping stale adjustment list for {}", user_id);
            return Ok(());
        }
        slot.entry = Some((adjustments.to_vec(), expiry));
        Ok(())
    }

    async fn invalidate_user_adjustments(&self, user_id: &str) -> Result<(), LedgerError> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(user_adjustments_key(user_id)).or_default();
        slot.generation += 1;
        slot.entry = None;
        Ok(())
    }
}
