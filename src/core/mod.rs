pub mod balance;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod period;
pub mod services;
pub mod validation;
