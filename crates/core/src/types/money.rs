//! Type-safe money representation.
//!
//! Amounts are carried as integer cents so they can round-trip through the
//! database without floating-point drift; [`rust_decimal`] provides the
//! display/arithmetic view. One currency only - the storefront sells in a
//! single locale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error computing a monetary amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Multiplication or addition overflowed i64 cents.
    #[error("monetary amount overflow")]
    Overflow,
}

/// A monetary amount in integer cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a money value from integer cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the amount in integer cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Decimal view of the amount (e.g., `12.34`).
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiply by a line quantity, checking for overflow.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product exceeds i64 cents.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Add another amount, checking for overflow.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the sum exceeds i64 cents.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.as_decimal())
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}
