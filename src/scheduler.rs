//! Fires the balance batch at the start of every calendar month for the
//! month that just ended.

use crate::core::balance::BalanceService;
use crate::core::period::YearMonth;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::{BalanceStore, TransactionLedger, UserDirectory};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// First instant at or after `now` that is day 1 of a month at `hour`:00 UTC.
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let this_month = YearMonth::containing(now.date_naive());
    let candidate = run_instant(this_month.first_day(), hour);
    if candidate >= now {
        candidate
    } else {
        run_instant(this_month.next().first_day(), hour)
    }
}

fn run_instant(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = day
        .and_hms_opt(hour.min(23), 0, 0)
        .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN));
    Utc.from_utc_datetime(&time)
}

pub struct MonthlyBalanceScheduler<L, S>
where
    L: LoggingService + 'static,
    S: UserDirectory + TransactionLedger + BalanceStore + 'static,
{
    service: Arc<BalanceService<L, S>>,
    hour: u32,
}

impl<L, S> MonthlyBalanceScheduler<L, S>
where
    L: LoggingService + 'static,
    S: UserDirectory + TransactionLedger + BalanceStore + 'static,
{
    pub fn new(service: Arc<BalanceService<L, S>>, hour: u32) -> Self {
        MonthlyBalanceScheduler { service, hour }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, self.hour);
            info!("Next monthly balance run at {}", next);
            tokio::time::sleep((next - now).to_std().unwrap_or(Duration::ZERO)).await;

            let target = YearMonth::containing(next.date_naive()).previous();
            match self.service.generate_for_all_users(target).await {
                Ok(report) => info!(
                    period = %report.period,
                    succeeded = report.succeeded,
                    failed = report.failures.len(),
                    "Monthly balance run complete"
                ),
                Err(e) => error!("Monthly balance run for {} failed: {}", target, e),
            }

            // step past the run instant so the same slot is not picked again
            if Utc::now() <= next {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn runs_later_today_when_still_before_the_hour() {
        assert_eq!(next_run_after(at(2024, 5, 1, 1, 30), 2), at(2024, 5, 1, 2, 0));
    }

    #[test]
    fn exact_run_instant_is_due_now() {
        assert_eq!(next_run_after(at(2024, 5, 1, 2, 0), 2), at(2024, 5, 1, 2, 0));
    }

    #[test]
    fn otherwise_waits_for_next_month() {
        assert_eq!(next_run_after(at(2024, 5, 1, 2, 1), 2), at(2024, 6, 1, 2, 0));
        assert_eq!(next_run_after(at(2024, 12, 15, 0, 0), 0), at(2025, 1, 1, 0, 0));
    }
}
