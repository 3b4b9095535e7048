//! Fixed-point money stored as integer minor units.
//!
//! Amounts are kept as a signed count of cents so that the greedy netting
//! loop never accumulates rounding drift. Decimal text is only handled at
//! the boundary, through `rust_decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when converting decimal text into [`Money`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The text is not a decimal number
    #[error("invalid amount {input:?}: {reason}")]
    Parse { input: String, reason: String },

    /// More fractional digits than the currency's minor unit allows
    #[error("amount {0} has more than {digits} decimal places", digits = Money::MINOR_DIGITS)]
    TooPrecise(String),

    /// Does not fit into the minor-unit representation
    #[error("amount {0} is out of range")]
    OutOfRange(String),
}

/// A currency amount counted in minor units (cents).
///
/// May be negative: net balances are signed. Input records are validated
/// to be non-negative by the ledger.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use poker_settlement::Money;
///
/// let amount = Money::from_str("10.5").unwrap();
/// assert_eq!(amount.minor_units(), 1050);
/// assert_eq!(amount.to_string(), "10.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Number of decimal digits in one major unit.
    pub const MINOR_DIGITS: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(0);

    /// Creates an amount from a count of minor units.
    pub const fn from_minor(units: i64) -> Self {
        Money(units)
    }

    /// Creates an amount from whole major units.
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the amount as a count of minor units.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Converts a decimal value, rejecting sub-cent precision.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let mut normalized = value.normalize();
        if normalized.scale() > Self::MINOR_DIGITS {
            return Err(MoneyError::TooPrecise(value.to_string()));
        }
        normalized.rescale(Self::MINOR_DIGITS);
        i64::try_from(normalized.mantissa())
            .map(Money)
            .map_err(|_| MoneyError::OutOfRange(value.to_string()))
    }

    /// Returns the amount as a decimal in major units.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, Self::MINOR_DIGITS)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Adds, returning `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed).map_err(|e| MoneyError::Parse {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        Money::from_decimal(decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
