//! Money parsing and minor-unit conversion.
//!
//! The commerce backend reports prices as formatted display strings (for
//! example `"$125.50"` or `"kr 99"`). The payment processor wants an integer
//! amount in minor currency units (cents). This module owns that conversion.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing money values.
#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    /// The input contained no parseable decimal amount.
    #[error("unparseable amount: {0:?}")]
    Unparseable(String),
}

/// A monetary amount with its currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount in the currency's standard unit (dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Parse a formatted display price such as `"$125.50"`.
    ///
    /// Currency symbols, thousands separators, and whitespace are stripped;
    /// only digits and the decimal point survive.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Unparseable`] if no decimal amount remains after
    /// stripping.
    pub fn parse_display(display: &str, currency_code: &str) -> Result<Self, MoneyError> {
        let amount = parse_amount(display)
            .ok_or_else(|| MoneyError::Unparseable(display.to_string()))?;
        Ok(Self {
            amount,
            currency_code: currency_code.to_string(),
        })
    }

    /// The amount in integer minor units (e.g. cents), rounded to nearest.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        to_minor_units(self.amount)
    }
}

/// Convert a formatted display total into integer minor units.
///
/// `"$125.50"` becomes `12550`. Returns `None` when the input holds no
/// parseable amount; callers must additionally reject non-positive results
/// before initiating a payment.
#[must_use]
pub fn minor_units(display: &str) -> Option<i64> {
    parse_amount(display).and_then(to_minor_units)
}

/// Strip every character except digits and the decimal point, then parse.
fn parse_amount(display: &str) -> Option<Decimal> {
    let cleaned: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Round to the nearest minor unit, half away from zero.
fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_dollar_total() {
        assert_eq!(minor_units("$125.50"), Some(12550));
    }

    #[test]
    fn test_minor_units_plain_number() {
        assert_eq!(minor_units("100"), Some(10000));
    }

    #[test]
    fn test_minor_units_with_currency_suffix() {
        assert_eq!(minor_units("99.90 kr"), Some(9990));
    }

    #[test]
    fn test_minor_units_rounds_to_nearest() {
        // Sub-cent amounts round half away from zero
        assert_eq!(minor_units("1.005"), Some(101));
        assert_eq!(minor_units("1.004"), Some(100));
    }

    #[test]
    fn test_minor_units_zero() {
        assert_eq!(minor_units("0"), Some(0));
        assert_eq!(minor_units("$0.00"), Some(0));
    }

    #[test]
    fn test_minor_units_unparseable() {
        assert_eq!(minor_units(""), None);
        assert_eq!(minor_units("free"), None);
    }

    #[test]
    fn test_parse_display() {
        let money = Money::parse_display("$19.99", "USD").unwrap();
        assert_eq!(money.amount, Decimal::new(1999, 2));
        assert_eq!(money.currency_code, "USD");
        assert_eq!(money.minor_units(), Some(1999));
    }

    #[test]
    fn test_parse_display_unparseable() {
        let err = Money::parse_display("n/a", "USD").unwrap_err();
        assert!(matches!(err, MoneyError::Unparseable(_)));
    }
}
