//! Money type for rent and fee amounts.
//!
//! Amounts are held as integer cents so sums and shares stay exact. All
//! rounding to the cent happens in one place, [`Money::share`].

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::{RentshareError, Result};
use crate::percentage::Percentage;

/// A monetary amount stored as cents (hundredths of the currency unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create an amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole units and cents (`from_units_cents(10, 50)` is 10.50).
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Proportional share of this amount, rounded half-to-even to the cent.
    ///
    /// Computes `self * percentage / 100` exactly in integer arithmetic
    /// before rounding, so the result is deterministic across platforms.
    pub fn share(&self, percentage: Percentage) -> Money {
        let numerator = i128::from(self.0) * i128::from(percentage.micros());
        let denominator = i128::from(Percentage::FULL_MICROS);
        Money(round_half_even(numerator, denominator) as i64)
    }

    /// Even split into `parts` pieces, rounded half to even. `None` for zero parts.
    pub fn divided_by(&self, parts: usize) -> Option<Money> {
        if parts == 0 {
            return None;
        }
        let quotient = round_half_even(i128::from(self.0), parts as i128);
        Some(Money(quotient as i64))
    }

    /// Parse a decimal amount such as `"1000"`, `"1000.5"` or `"-12.34"`.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        let invalid = || RentshareError::InvalidArgument(format!("Invalid amount: '{}'", s));

        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        if digits.is_empty() {
            return Err(invalid());
        }

        let (units_str, cents_str) = match digits.split_once('.') {
            Some((units, cents)) => (units, cents),
            None => (digits, ""),
        };
        if units_str.is_empty()
            || !units_str.chars().all(|c| c.is_ascii_digit())
            || !cents_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if cents_str.len() > 2 {
            return Err(RentshareError::InvalidArgument(format!(
                "Amount '{}' has more than two decimal places",
                s
            )));
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;
        let cents: i64 = match cents_str.len() {
            0 => 0,
            1 => cents_str.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => cents_str.parse().map_err(|_| invalid())?,
        };
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

/// Integer division rounding half to even. `denominator` must be positive.
fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    let twice = remainder * 2;
    if twice > denominator || (twice == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(s: &str) -> Percentage {
        Percentage::parse(s).expect("valid percentage")
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Money::parse("1000").unwrap(), Money::from_cents(100_000));
        assert_eq!(Money::parse("1000.5").unwrap(), Money::from_cents(100_050));
        assert_eq!(Money::parse("-12.34").unwrap(), Money::from_cents(-1234));
        assert_eq!(Money::parse(" 0.07 ").unwrap(), Money::from_cents(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.234").is_err());
        assert!(Money::parse(".5").is_err());
        assert!(Money::parse("1,5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(123_456).to_string(), "1234.56");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_share_exact() {
        let fee = Money::from_units_cents(1000, 0);
        assert_eq!(fee.share(pct("60")), Money::from_units_cents(600, 0));
        assert_eq!(fee.share(pct("40")), Money::from_units_cents(400, 0));
    }

    #[test]
    fn test_share_rounds_half_to_even() {
        // 0.05 * 50% = 0.025 -> 0.02
        assert_eq!(Money::from_cents(5).share(pct("50")), Money::from_cents(2));
        // 0.15 * 50% = 0.075 -> 0.08
        assert_eq!(Money::from_cents(15).share(pct("50")), Money::from_cents(8));
        // 100.00 * 33.333333% = 33.333333 -> 33.33
        assert_eq!(
            Money::from_cents(10_000).share(pct("33.333333")),
            Money::from_cents(3333)
        );
    }

    #[test]
    fn test_share_negative_amount() {
        assert_eq!(Money::from_cents(-5).share(pct("50")), Money::from_cents(-2));
        assert_eq!(Money::from_cents(-15).share(pct("50")), Money::from_cents(-8));
    }

    #[test]
    fn test_divided_by() {
        assert_eq!(Money::from_cents(1000).divided_by(3), Some(Money::from_cents(333)));
        assert_eq!(Money::from_cents(5).divided_by(2), Some(Money::from_cents(2)));
        assert_eq!(Money::from_cents(5).divided_by(0), None);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(600));
    }
}
