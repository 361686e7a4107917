pub mod adjustment;
pub mod audit;
pub mod expense;
pub mod income;
pub mod monthly_balance;
pub mod page;
pub mod user;
