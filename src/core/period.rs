use crate::core::errors::LedgerError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A calendar month.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(LedgerError::InvalidPeriod { year, month });
        }
        Ok(YearMonth { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            YearMonth {
                year: self.year - 1,
                month: 12,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn previous_wraps_year_boundary() {
        let january = YearMonth::new(2024, 1).unwrap();
        assert_eq!(january.previous(), YearMonth { year: 2023, month: 12 });
        assert_eq!(YearMonth::new(2024, 7).unwrap().previous(), YearMonth { year: 2024, month: 6 });
    }

    #[test]
    fn last_day_handles_leap_years() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));
        assert_eq!(YearMonth::new(2023, 2).unwrap().last_day(), date(2023, 2, 28));
        assert_eq!(YearMonth::new(2023, 12).unwrap().last_day(), date(2023, 12, 31));
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert_eq!(
            YearMonth::new(2024, 13),
            Err(LedgerError::InvalidPeriod { year: 2024, month: 13 })
        );
        assert!(YearMonth::new(2024, 0).is_err());
    }

    #[test]
    fn containing_and_contains_agree() {
        let period = YearMonth::containing(date(2024, 3, 15));
        assert_eq!(period.to_string(), "2024-03");
        assert!(period.contains(date(2024, 3, 1)));
        assert!(period.contains(date(2024, 3, 31)));
        assert!(!period.contains(date(2024, 4, 1)));
    }
}
