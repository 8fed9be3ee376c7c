use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Calendar month a forecast projects into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthContext {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
}

impl MonthContext {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        let days_in_month = days_in_month(year, month).ok_or_else(|| {
            DomainError::invalid_option("month", format!("{year}-{month:02} is not a calendar month"))
        })?;
        Ok(Self { year, month, days_in_month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            // A valid date always sits in a valid month.
            days_in_month: days_in_month(date.year(), date.month()).unwrap_or(31),
        }
    }
}

/// Number of days in `month` (1-12) of `year`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

pub(crate) fn validate_days_in_month(days_in_month: u32) -> Result<(), DomainError> {
    if (1..=31).contains(&days_in_month) {
        Ok(())
    } else {
        Err(DomainError::invalid_option(
            "days_in_month",
            format!("must be in 1..=31, got {days_in_month}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_days_including_leap_february() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2026, 2), Some(28));
        assert_eq!(days_in_month(2026, 10), Some(31));
        assert_eq!(days_in_month(2026, 12), Some(31));
        assert_eq!(days_in_month(2026, 13), None);
    }

    #[test]
    fn context_from_date_uses_its_month() {
        let date = NaiveDate::from_ymd_opt(2026, 4, 17).expect("valid date");
        let context = MonthContext::from_date(date);

        assert_eq!(context, MonthContext { year: 2026, month: 4, days_in_month: 30 });
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(MonthContext::new(2026, 0).is_err());
        assert!(validate_days_in_month(0).is_err());
        assert!(validate_days_in_month(32).is_err());
        assert!(validate_days_in_month(28).is_ok());
    }
}
