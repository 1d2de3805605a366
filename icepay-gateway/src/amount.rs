//! Integer minor-unit amounts.
//!
//! Icepay expects every amount in the smallest denomination of the currency
//! (`AmountInCents`). Request builders only ever see [`MinorUnits`]; converting
//! a major-unit decimal such as `15.99` is done once, up front, and rejects
//! amounts that cannot be represented exactly.

use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Amount in minor currency units (cents for EUR).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    /// Wraps a raw minor-unit value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw minor-unit value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Converts a major-unit decimal into minor units.
    ///
    /// `decimals` is the currency exponent (2 for EUR, 0 for JPY).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] when the amount is negative,
    /// carries more precision than the currency allows, or overflows `u64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use icepay_gateway::amount::MinorUnits;
    /// use rust_decimal::Decimal;
    ///
    /// let amount = MinorUnits::from_decimal(Decimal::new(1599, 2), 2).unwrap();
    /// assert_eq!(amount.get(), 1599);
    /// ```
    pub fn from_decimal(amount: Decimal, decimals: u32) -> Result<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(GatewayError::InvalidInput(format!(
                "amount must not be negative: {amount}"
            )));
        }

        let factor = 10_u64
            .checked_pow(decimals)
            .map(Decimal::from)
            .ok_or_else(|| {
                GatewayError::InvalidInput(format!("unsupported exponent: {decimals}"))
            })?;

        let scaled = amount
            .checked_mul(factor)
            .ok_or_else(|| GatewayError::InvalidInput(format!("amount out of range: {amount}")))?;

        if !scaled.fract().is_zero() {
            return Err(GatewayError::InvalidInput(format!(
                "amount {amount} has more than {decimals} decimal places"
            )));
        }

        scaled
            .to_u64()
            .map(Self)
            .ok_or_else(|| GatewayError::InvalidInput(format!("amount out of range: {amount}")))
    }

    /// Converts back to a major-unit decimal.
    #[must_use]
    pub fn to_decimal(self, decimals: u32) -> Decimal {
        let mut value = Decimal::from(self.0);
        // set_scale only fails above 28, where no currency lives
        if value.set_scale(decimals).is_err() {
            return Decimal::from(self.0);
        }
        value
    }
}

impl From<u64> for MinorUnits {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
