use crate::error::WalletError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places carried by the currency (paise).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A non-negative monetary value held as an integer count of minor units.
///
/// Balances and order totals never go through floating point. Conversion from the
/// decimal values found in request bodies happens once, at the edge, through
/// [`Money::from_decimal`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    /// Converts a decimal amount (e.g. `12.50`) into minor units.
    ///
    /// Rejects negative values and anything finer than one minor unit.
    pub fn from_decimal(value: Decimal) -> Result<Self, WalletError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(WalletError::Validation(format!(
                "amount {value} must not be negative"
            )));
        }
        let normalized = value.normalize();
        if normalized.scale() > MINOR_UNIT_SCALE {
            return Err(WalletError::Validation(format!(
                "amount {value} has more than {MINOR_UNIT_SCALE} decimal places"
            )));
        }
        normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|minor| minor.to_u64())
            .map(Self)
            .ok_or_else(|| WalletError::Validation(format!("amount {value} is out of range")))
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), MINOR_UNIT_SCALE)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, factor: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(factor)).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl TryFrom<Decimal> for Money {
    type Error = WalletError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

/// A strictly positive amount for wallet adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Amount(Money);

impl Amount {
    pub fn new(value: Money) -> Result<Self, WalletError> {
        if value.is_zero() {
            Err(WalletError::Validation(
                "amount must be greater than zero".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }

    pub fn money(self) -> Money {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = WalletError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(Money::from_decimal(value)?)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
