use crate::error::MarketError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A rental rate with 4 decimal places precision, charged per day for
/// physical items and per hour for services.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific rules
/// and provide type safety for pricing calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(value: Decimal) -> Result<Self, MarketError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(MarketError::ValidationError(
                "Rate must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Total owed for a rental of the given duration at this rate.
    pub fn total_for_days(&self, days: u32) -> Money {
        Money(self.0 * Decimal::from(days))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = MarketError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A non-negative monetary total (costs, deposits).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub fn new(value: Decimal) -> Result<Self, MarketError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(MarketError::ValidationError(
                "Amount cannot be negative".to_string(),
            ))
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_validation() {
        assert!(Rate::new(dec!(7.5)).is_ok());
        assert!(matches!(
            Rate::new(dec!(0.0)),
            Err(MarketError::ValidationError(_))
        ));
        assert!(matches!(
            Rate::new(dec!(-1.0)),
            Err(MarketError::ValidationError(_))
        ));
    }

    #[test]
    fn test_total_for_days() {
        let rate = Rate::new(dec!(7.5)).unwrap();
        assert_eq!(rate.total_for_days(4), Money(dec!(30.0)));
        assert_eq!(rate.total_for_days(0), Money(dec!(0.0)));
    }

    #[test]
    fn test_money_rejects_negative() {
        assert!(Money::new(dec!(0.0)).is_ok());
        assert!(matches!(
            Money::new(dec!(-0.01)),
            Err(MarketError::ValidationError(_))
        ));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.0)).unwrap();
        let b = Money::new(dec!(5.0)).unwrap();
        assert_eq!(a + b, Money(dec!(15.0)));
    }
}
