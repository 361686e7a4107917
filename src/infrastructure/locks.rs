use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-expense async mutexes. Holding the guard serializes the
/// read-validate-write sequence for adjustments on one expense.
#[derive(Clone, Default)]
pub struct ExpenseLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ExpenseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, expense_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // drop entries nobody is holding or waiting on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(expense_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_expense_is_exclusive() {
        let locks = ExpenseLocks::new();
        let guard = locks.acquire("e1").await;

        let contender = locks.clone();
        let blocked = tokio::time::timeout(Duration::from_millis(50), contender.acquire("e1")).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.acquire("e1")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_expenses_do_not_block() {
        let locks = ExpenseLocks::new();
        let _first = locks.acquire("e1").await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire("e2")).await;
        assert!(second.is_ok());
    }
}
