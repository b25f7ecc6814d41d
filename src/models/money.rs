//! Money type for representing currency amounts
//!
//! Internally stores amounts in integer minor units (i64 cents) to avoid
//! floating-point precision issues. Formatting and parsing are driven by a
//! configurable [`CurrencyFormat`] so the same amount round-trips through
//! any locale's separators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::WorkshopError;

/// A monetary amount stored as minor units (hundredths of the currency unit)
///
/// Using i64 minor units keeps every arithmetic operation exact; there is no
/// rounding anywhere in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from minor units
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in minor units
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole major-unit portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the minor-unit portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is strictly positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.units(), self.cents_part())
        }
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

/// Multiply an amount by an integer quantity. Exact, no rounding.
impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, quantity: i64) -> Self {
        Self(self.0 * quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Locale configuration for rendering and reading amounts
///
/// `parse(format(x)) == x` holds for every amount and every configuration in
/// which the three separator characters are pairwise distinct and non-digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// Currency symbol prepended on display (e.g. "$", "€")
    pub symbol: String,
    /// Thousands separator (e.g. ',' or '.')
    pub grouping_separator: char,
    /// Decimal separator (e.g. '.' or ',')
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            grouping_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl CurrencyFormat {
    /// Format an amount for display: symbol, grouped units, two decimals
    pub fn format(&self, amount: Money) -> String {
        let units = amount.units().abs();
        let mut grouped = String::new();
        let digits = units.to_string();
        let len = digits.len();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push(self.grouping_separator);
            }
            grouped.push(ch);
        }

        let sign = if amount.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}{}{:02}",
            sign,
            self.symbol,
            grouped,
            self.decimal_separator,
            amount.cents_part()
        )
    }

    /// Parse an amount from user input
    ///
    /// Accepts an optional leading minus and an optional currency symbol,
    /// ignores grouping separators, and allows at most one decimal separator
    /// followed by up to two digits. Any other non-digit character is an
    /// error; amounts with more than two decimal places are not representable
    /// and are rejected rather than rounded.
    pub fn parse(&self, text: &str) -> Result<Money, MoneyParseError> {
        let text = text.trim();

        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let text = text.strip_prefix(self.symbol.as_str()).unwrap_or(text);

        if text.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let mut units: i64 = 0;
        let mut fraction: i64 = 0;
        let mut fraction_digits = 0usize;
        let mut seen_decimal = false;

        for ch in text.chars() {
            if let Some(digit) = ch.to_digit(10) {
                if seen_decimal {
                    if fraction_digits == 2 {
                        return Err(MoneyParseError::TooManyDecimalPlaces);
                    }
                    fraction = fraction * 10 + i64::from(digit);
                    fraction_digits += 1;
                } else {
                    units = units
                        .checked_mul(10)
                        .and_then(|u| u.checked_add(i64::from(digit)))
                        .ok_or(MoneyParseError::Overflow)?;
                }
            } else if ch == self.decimal_separator {
                if seen_decimal {
                    return Err(MoneyParseError::MultipleDecimalSeparators);
                }
                seen_decimal = true;
            } else if ch == self.grouping_separator && !seen_decimal {
                // Grouping separators are display sugar; skip them.
            } else {
                return Err(MoneyParseError::UnexpectedCharacter(ch));
            }
        }

        // "10.5" means 10.50, not 10.05
        if fraction_digits == 1 {
            fraction *= 10;
        }

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or(MoneyParseError::Overflow)?;

        Ok(Money::from_cents(if negative { -cents } else { cents }))
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyParseError {
    Empty,
    UnexpectedCharacter(char),
    MultipleDecimalSeparators,
    TooManyDecimalPlaces,
    Overflow,
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::Empty => write!(f, "empty amount"),
            MoneyParseError::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character '{}'", ch)
            }
            MoneyParseError::MultipleDecimalSeparators => {
                write!(f, "more than one decimal separator")
            }
            MoneyParseError::TooManyDecimalPlaces => {
                write!(f, "more than two decimal places")
            }
            MoneyParseError::Overflow => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for MoneyParseError {}

impl From<MoneyParseError> for WorkshopError {
    fn from(err: MoneyParseError) -> Self {
        WorkshopError::InvalidAmount(err.to_string())
    }
}
