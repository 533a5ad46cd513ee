//! Ownership percentage with fixed six-decimal precision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RentshareError, Result};

/// Number of decimal places kept for a percentage.
pub const PERCENTAGE_SCALE: u32 = 6;

const MICROS_PER_PERCENT: i64 = 1_000_000;

/// Share of a property owned by one owner, bounded to `[0, 100]`.
///
/// Stored as millionths of a percent (`25%` is `25_000_000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PercentageRepr", into = "String")]
pub struct Percentage(i64);

/// Accepted serialized forms: `"12.5"` or `12.5`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PercentageRepr {
    Text(String),
    Number(serde_json::Number),
}

impl Percentage {
    /// Micro-percent value of 100%.
    pub const FULL_MICROS: i64 = 100 * MICROS_PER_PERCENT;

    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(Self::FULL_MICROS);

    /// Build from millionths of a percent, rejecting values outside `[0, 100]`.
    pub fn from_micros(micros: i64) -> Result<Self> {
        if !(0..=Self::FULL_MICROS).contains(&micros) {
            return Err(RentshareError::InvalidArgument(format!(
                "Percentage {} is outside [0, 100]",
                format_micros(micros)
            )));
        }
        Ok(Self(micros))
    }

    /// Build from a whole number of percent.
    pub fn whole(percent: u8) -> Result<Self> {
        Self::from_micros(i64::from(percent) * MICROS_PER_PERCENT)
    }

    pub const fn micros(&self) -> i64 {
        self.0
    }

    /// Parse `"25"`, `"33.333333"`, `"25%"` or `"25,5"`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || RentshareError::InvalidArgument(format!("Invalid percentage: '{}'", s));

        let cleaned = s.trim().trim_end_matches('%').trim().replace(',', ".");
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let (whole_str, frac_str) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };
        if whole_str.is_empty()
            || !whole_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac_str.len() > PERCENTAGE_SCALE as usize {
            return Err(RentshareError::InvalidArgument(format!(
                "Percentage '{}' has more than {} decimal places",
                s, PERCENTAGE_SCALE
            )));
        }

        let whole: i64 = whole_str.parse().map_err(|_| invalid())?;
        let frac: i64 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_str, width = PERCENTAGE_SCALE as usize);
            padded.parse().map_err(|_| invalid())?
        };
        let micros = whole
            .checked_mul(MICROS_PER_PERCENT)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;

        Self::from_micros(if negative { -micros } else { micros })
    }
}

impl TryFrom<PercentageRepr> for Percentage {
    type Error = RentshareError;

    fn try_from(repr: PercentageRepr) -> Result<Self> {
        match repr {
            PercentageRepr::Text(text) => Self::parse(&text),
            PercentageRepr::Number(number) => Self::parse(&number.to_string()),
        }
    }
}

impl From<Percentage> for String {
    fn from(value: Percentage) -> Self {
        format_micros(value.0)
    }
}

/// Render millionths of a percent without the `%` sign (`"12.5"`).
pub(crate) fn format_micros(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let whole = abs / MICROS_PER_PERCENT as u64;
    let frac = abs % MICROS_PER_PERCENT as u64;
    if frac == 0 {
        format!("{}{}", sign, whole)
    } else {
        let frac = format!("{:06}", frac);
        format!("{}{}.{}", sign, whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", format_micros(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Percentage::parse("25").unwrap().micros(), 25_000_000);
        assert_eq!(Percentage::parse("25%").unwrap().micros(), 25_000_000);
        assert_eq!(Percentage::parse("25,5").unwrap().micros(), 25_500_000);
        assert_eq!(Percentage::parse("33.333333").unwrap().micros(), 33_333_333);
        assert_eq!(Percentage::parse("100").unwrap(), Percentage::FULL);
        assert_eq!(Percentage::parse("0").unwrap(), Percentage::ZERO);
    }

    #[test]
    fn test_fraction_is_not_rescaled() {
        assert_eq!(Percentage::parse("0.5").unwrap().micros(), 500_000);
    }

    #[test]
    fn test_bounds() {
        assert!(Percentage::parse("100.000001").is_err());
        assert!(Percentage::parse("-1").is_err());
        assert!(Percentage::from_micros(-1).is_err());
        assert!(Percentage::whole(101).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Percentage::parse("").is_err());
        assert!(Percentage::parse("abc").is_err());
        assert!(Percentage::parse("1.1234567").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Percentage::whole(60).unwrap().to_string(), "60%");
        assert_eq!(Percentage::parse("12.5").unwrap().to_string(), "12.5%");
    }

    #[test]
    fn test_serde_forms() {
        let parsed: std::result::Result<Percentage, _> = serde_json::from_str("250");
        assert!(parsed.is_err());
        let parsed: Percentage = serde_json::from_str("40").unwrap();
        assert_eq!(parsed, Percentage::whole(40).unwrap());
        let parsed: Percentage = serde_json::from_str("\"12,5%\"").unwrap();
        assert_eq!(parsed.micros(), 12_500_000);
        let parsed: Percentage = serde_json::from_str("33.333333").unwrap();
        assert_eq!(parsed.micros(), 33_333_333);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"33.333333\"");
    }
}
