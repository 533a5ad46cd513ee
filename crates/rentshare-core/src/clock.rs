//! Clock interface and version stamps.
//!
//! Ownership versions are identified by the instant they were created. The
//! clock is injected so callers (and tests) control what "now" means.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RentshareError, Result};

/// Source of the current time for version stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = instant;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Identity of one ownership version: a UTC instant at microsecond precision.
///
/// Persisted as fixed-width RFC 3339 text, so ordering the text orders the
/// stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionStamp(DateTime<Utc>);

impl VersionStamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant.trunc_subsecs(6))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Calendar date (UTC) the version belongs to.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// The smallest stamp strictly after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + Duration::microseconds(1))
    }

    pub fn to_db_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn parse_db(value: &str) -> Result<Self> {
        let parsed = DateTime::parse_from_rfc3339(value)
            .map_err(|e| RentshareError::Storage(format!("Invalid version stamp: {}", e)))?;
        Ok(Self::new(parsed.with_timezone(&Utc)))
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_truncates_to_micros() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
            + Duration::nanoseconds(1_234_567);
        let stamp = VersionStamp::new(instant);
        assert_eq!(stamp.to_db_string(), "2025-03-01T12:00:00.001234Z");
    }

    #[test]
    fn test_db_round_trip_and_ordering() {
        let a = VersionStamp::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        let b = a.next();
        assert!(a < b);
        assert!(a.to_db_string() < b.to_db_string());
        assert_eq!(VersionStamp::parse_db(&b.to_db_string()).unwrap(), b);
    }

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::days(1));
        assert_eq!(clock.now().date_naive().to_string(), "2025-01-02");
    }
}
