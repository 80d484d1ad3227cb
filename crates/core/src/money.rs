use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A monetary value stored as whole hundredths of the currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn to_cents(self) -> i64 {
        self.0
    }

    /// Rounds to two decimal places. Returns `None` when the value does not
    /// fit in `i64` hundredths.
    pub fn from_decimal(decimal: Decimal) -> Option<Self> {
        decimal
            .round_dp(2)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Money)
    }

    /// Parses a plain numeric token such as `5,000` or `1234.50`.
    /// Thousands separators are dropped before parsing. Values beyond
    /// `i64` hundredths (about 9.2e16 units) yield `None`, so the amount and
    /// its currency are both left unset.
    pub fn parse(token: &str) -> Option<Self> {
        let clean = token.replace(',', "");
        Decimal::from_str(&clean).ok().and_then(Self::from_decimal)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn to_f64(self) -> f64 {
        self.to_decimal().to_f64().unwrap_or_default()
    }

    pub fn zero() -> Self {
        Money(0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

/// Currencies recognised in message bodies. Each one is announced by a
/// marker token written right after the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Rwf,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Rwf => "RWF",
        }
    }

    /// Token that follows an amount in message text, matched case-insensitively.
    pub fn marker(self) -> &'static str {
        match self {
            Currency::Rwf => "rwf",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
