use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub balance_scheduler_enabled: bool,
    pub balance_schedule_hour: u32,
    pub balance_batch_concurrency: usize,
    pub adjustment_cache_ttl_secs: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env_or("PORT", 3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            balance_scheduler_enabled: env_or("BALANCE_SCHEDULER_ENABLED", true),
            balance_schedule_hour: env_or("BALANCE_SCHEDULE_HOUR", 0u32).min(23),
            balance_batch_concurrency: env_or("BALANCE_BATCH_CONCURRENCY", 4usize).max(1),
            adjustment_cache_ttl_secs: env_or("ADJUSTMENT_CACHE_TTL_SECS", 300),
        }
    }
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
