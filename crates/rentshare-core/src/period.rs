//! Rent periods (calendar month of a year).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RentshareError, Result};

/// Earliest accepted rent year.
pub const MIN_YEAR: i32 = 2000;

/// Latest accepted rent year.
pub const MAX_YEAR: i32 = 2100;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A (year, month) rent period. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(RentshareError::InvalidArgument(format!(
                "Month {} is outside 1..=12",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Human-readable label, e.g. `"March 2025"`.
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    /// Last representable instant of the period (UTC, microsecond precision).
    pub fn end_instant(&self) -> DateTime<Utc> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let next_start = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        next_start - Duration::microseconds(1)
    }
}

/// Reject years outside the accepted range.
pub fn validate_year(year: i32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(RentshareError::InvalidArgument(format!(
            "Year {} is outside {}..={}",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(())
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = RentshareError;

    /// Parse `"2025-03"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RentshareError::InvalidArgument(format!("Invalid period: '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}
