pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod scheduler;

pub use crate::core::balance::BalanceService;
pub use crate::core::errors::LedgerError;
pub use crate::core::services::AdjustmentService;
pub use infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests; // service-level tests
