//! Donation amounts using decimal arithmetic.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Amount`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a decimal number.
    #[error("amount must be a number, got {0:?}")]
    NotANumber(String),
    /// The amount is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// A monetary amount in the parish's currency.
///
/// The backend stores amounts as floating point and sends them as JSON
/// numbers; the client keeps them as [`Decimal`] so that totals over many
/// donations do not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal value.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl std::str::FromStr for Amount {
    type Err = AmountError;

    /// Parses user input such as `"25"` or `"12.50"`. Only positive amounts
    /// are accepted; amounts received from the backend are not checked.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Decimal = s
            .trim()
            .parse()
            .map_err(|_| AmountError::NotANumber(s.to_owned()))?;
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(value))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_input() {
        let amount: Amount = "12.50".parse().unwrap();
        assert_eq!(amount.to_string(), "12.50");
        assert_eq!("abc".parse::<Amount>(), Err(AmountError::NotANumber("abc".into())));
        assert_eq!("0".parse::<Amount>(), Err(AmountError::NotPositive));
        assert_eq!("-5".parse::<Amount>(), Err(AmountError::NotPositive));
    }

    #[test]
    fn test_decodes_json_number() {
        let amount: Amount = serde_json::from_str("100.25").unwrap();
        assert_eq!(amount, "100.25".parse().unwrap());
    }

    #[test]
    fn test_encodes_json_number() {
        let amount: Amount = "40".parse().unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "40.0");
    }

    #[test]
    fn test_sum_is_exact() {
        let amounts: Vec<Amount> = ["0.10", "0.20", "0.30"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let total: Amount = amounts.iter().sum();
        assert_eq!(total.to_string(), "0.60");
    }
}
