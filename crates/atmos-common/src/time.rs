//! The shared integer time axis.
//!
//! Every gridded file in the workflow stores time as whole days since
//! 1990-01-01 (the `t` coordinate). Tabular exports carry ISO dates.

use chrono::NaiveDate;

use crate::error::{CommonError, Result};

/// The reference epoch for the `t` coordinate: 1990-01-01.
pub const EPOCH: (i32, u32, u32) = (1990, 1, 1);

fn epoch_date() -> NaiveDate {
    // The epoch components are compile-time constants and always valid.
    NaiveDate::from_ymd_opt(EPOCH.0, EPOCH.1, EPOCH.2).unwrap()
}

/// Convert a day offset from the epoch into a calendar date.
pub fn days_to_date(days: i32) -> NaiveDate {
    epoch_date() + chrono::Duration::days(days as i64)
}

/// Convert a calendar date into a day offset from the epoch.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - epoch_date()).num_days() as i32
}

/// Parse a YYYY-MM-DD date string.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CommonError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_day_zero() {
        let epoch = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);
        assert_eq!(days_to_date(0), epoch);
    }

    #[test]
    fn test_days_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 15).unwrap();
        let days = date_to_days(date);
        assert_eq!(days_to_date(days), date);
        // 2023-07-15 is well past 30 years from the epoch
        assert!(days > 12000);
    }

    #[test]
    fn test_parse_iso_date() {
        let date = parse_iso_date("2019-03-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
        assert!(parse_iso_date("01/03/2019").is_err());
    }
}
