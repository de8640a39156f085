use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// A calendar month, the unit balances are computed and settled over.
///
/// Serialized as `YYYY-MM` in the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidAmount(format!(
                "invalid month: {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period a given instant falls into (UTC calendar).
    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Whether `instant` falls inside this calendar month.
    #[must_use]
    pub fn contains(self, instant: DateTime<Utc>) -> bool {
        instant.year() == self.year && instant.month() == self.month
    }

    /// First instant of the month (UTC midnight on the 1st).
    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        // Day 1 of a validated month always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_default()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
    }

    /// The following calendar month.
    #[must_use]
    pub fn next(self) -> Period {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid period: {s}"));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_and_display_round_trip() {
        let period: Period = "2026-08".parse().unwrap();
        assert_eq!(period.year(), 2026);
        assert_eq!(period.month(), 8);
        assert_eq!(period.to_string(), "2026-08");
    }

    #[test]
    fn rejects_invalid_months() {
        assert!("2026-00".parse::<Period>().is_err());
        assert!("2026-13".parse::<Period>().is_err());
        assert!("garbage".parse::<Period>().is_err());
    }

    #[test]
    fn contains_checks_year_and_month() {
        let period = Period::new(2026, 8).unwrap();
        let inside = Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        assert!(period.contains(inside));
        assert!(!period.contains(outside));
    }
}
