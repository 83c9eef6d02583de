//! Amount type for handling dollar values entered by hand.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may include dollar signs, commas, or stray characters
//! from free-form cell input.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Represents a dollar amount.
///
/// This type wraps `Decimal` and keeps arithmetic unrounded. Display rounds to
/// whole dollars in US locale format, which is the presentation contract for
/// proceeds tables; totals shown to the user are computed from the unrounded
/// values first and rounded only at the end.
///
/// # Examples
///
/// Parsing free-form cell input:
/// ```
/// # use proceeds::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,234.56").unwrap();
/// assert_eq!(amount.to_string(), "$1,235");
/// ```
///
/// Garbage input normalizes to zero rather than erroring:
/// ```
/// # use proceeds::model::Amount;
/// assert!(Amount::lenient("n/a").is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Converts a float into an Amount. Non-finite values become zero.
    pub fn from_f64(value: f64) -> Self {
        Self(Decimal::from_f64_retain(value).unwrap_or_default())
    }

    /// Returns the value as a float for payment math.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Returns the amount rounded to cents. Derived payments are stored this
    /// way so that recomputing them with unchanged inputs compares equal.
    pub fn round_cents(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Normalizes free-form cell input into an amount.
    ///
    /// Empty input is zero. All characters other than digits and the first
    /// decimal point are dropped, so `"$1,234.56"` parses as `1234.56` and
    /// `"1.2.3"` collapses to `1.23`. Anything left unparseable is zero.
    /// Malformed input is never an error here.
    pub fn lenient(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Amount::default();
        }

        let mut cleaned = String::with_capacity(trimmed.len());
        let mut seen_point = false;
        for c in trimmed.chars() {
            if c.is_ascii_digit() {
                cleaned.push(c);
            } else if c == '.' && !seen_point {
                seen_point = true;
                cleaned.push(c);
            }
        }

        Decimal::from_str(&cleaned)
            .map(Amount::new)
            .unwrap_or_default()
    }
}

impl FromStr for Amount {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Amount::lenient(s))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.0", num.to_f64().unwrap_or_default())
        )
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Proceeds records carry plain JSON numbers.
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl serde::de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a numeric string")
    }

    fn visit_f64<E>(self, v: f64) -> Result<Amount, E>
    where
        E: serde::de::Error,
    {
        Decimal::from_f64_retain(v)
            .map(Amount::new)
            .ok_or_else(|| E::custom(format!("{v} is not a finite number")))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Amount, E>
    where
        E: serde::de::Error,
    {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Amount, E>
    where
        E: serde::de::Error,
    {
        Ok(Amount::new(Decimal::from(v)))
    }

    // Legacy/mock data sometimes carries amounts as formatted strings.
    fn visit_str<E>(self, v: &str) -> Result<Amount, E>
    where
        E: serde::de::Error,
    {
        Ok(Amount::lenient(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_plain() {
        let amount = Amount::lenient("50000");
        assert_eq!(amount.value(), Decimal::from(50000));
    }

    #[test]
    fn test_lenient_currency_formatting() {
        let amount = Amount::lenient("$1,234.56");
        assert_eq!(amount.value(), Decimal::from_str("1234.56").unwrap());
    }

    #[test]
    fn test_lenient_empty_is_zero() {
        assert!(Amount::lenient("").is_zero());
        assert!(Amount::lenient("   ").is_zero());
    }

    #[test]
    fn test_lenient_garbage_is_zero() {
        assert!(Amount::lenient("n/a").is_zero());
        assert!(Amount::lenient("---").is_zero());
    }

    #[test]
    fn test_lenient_collapses_decimal_points() {
        let amount = Amount::lenient("1.2.3");
        assert_eq!(amount.value(), Decimal::from_str("1.23").unwrap());
    }

    #[test]
    fn test_lenient_strips_minus_sign() {
        // Proceeds cells are non-negative by policy; a minus sign is dropped
        // like any other stray character.
        let amount = Amount::lenient("-500");
        assert_eq!(amount.value(), Decimal::from(500));
    }

    #[test]
    fn test_lenient_mixed_garbage() {
        let amount = Amount::lenient("12a3.4x.5");
        assert_eq!(amount.value(), Decimal::from_str("123.45").unwrap());
    }

    #[test]
    fn test_display_whole_dollars() {
        let amount = Amount::lenient("1234.56");
        assert_eq!(amount.to_string(), "$1,235");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(Amount::ZERO.to_string(), "$0");
    }

    #[test]
    fn test_display_negative() {
        let amount = Amount::new(Decimal::from(-60000));
        assert_eq!(amount.to_string(), "-$60,000");
    }

    #[test]
    fn test_display_large() {
        let amount = Amount::lenient("1234567");
        assert_eq!(amount.to_string(), "$1,234,567");
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::lenient("50000");
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "50000.0");
    }

    #[test]
    fn test_deserialize_number() {
        let amount: Amount = serde_json::from_str("50000").unwrap();
        assert_eq!(amount.value(), Decimal::from(50000));

        let amount: Amount = serde_json::from_str("123.45").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("123.45").unwrap());
    }

    #[test]
    fn test_deserialize_string() {
        let amount: Amount = serde_json::from_str("\"$2,500\"").unwrap();
        assert_eq!(amount.value(), Decimal::from(2500));
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Amount::lenient("100"),
            Amount::lenient("200.50"),
            Amount::lenient("0"),
        ];
        let total: Amount = amounts.into_iter().sum();
        assert_eq!(total.value(), Decimal::from_str("300.50").unwrap());
    }

    #[test]
    fn test_round_cents() {
        let amount = Amount::lenient("1110.20514");
        assert_eq!(
            amount.round_cents().value(),
            Decimal::from_str("1110.21").unwrap()
        );
    }
}
