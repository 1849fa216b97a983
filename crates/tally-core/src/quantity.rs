//! # Quantity Module
//!
//! Exact quantities for goods sold by weight and by piece.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Quantity(i64) = thousandths of a unit                                  │
//! │                                                                         │
//! │  Unit::Kg   1.235 kg  ──►  Quantity(1235)   (grams)                     │
//! │  Unit::Un   3 pieces  ──►  Quantity(3000)                               │
//! │                                                                         │
//! │  Stored as `*_milli INTEGER` columns; shown as decimals on the wire.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wire format is a plain JSON number (`1.235`). Conversion from the
//! number rounds to the nearest thousandth and rejects non-finite input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};
use thiserror::Error;

/// Thousandths per whole unit.
pub const MILLI_PER_UNIT: i64 = 1000;

/// Signed quantity in thousandths of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quantity(i64);

impl Quantity {
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Decimal value for display and JSON. Lossless for |q| < 2^53 milli.
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / MILLI_PER_UNIT as f64
    }

    /// Parses a decimal quantity, rounding to the nearest thousandth.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::from_decimal(1.5).unwrap().milli(), 1500);
    /// assert_eq!(Quantity::from_decimal(0.0004).unwrap().milli(), 0);
    /// assert!(Quantity::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * MILLI_PER_UNIT as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Quantity(scaled as i64))
    }
}

// =============================================================================
// Serde Boundary
// =============================================================================

/// Error for quantities that cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("quantity must be a finite number")]
pub struct QuantityRangeError;

impl TryFrom<f64> for Quantity {
    type Error = QuantityRangeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Quantity::from_decimal(value).ok_or(QuantityRangeError)
    }
}

impl From<Quantity> for f64 {
    fn from(q: Quantity) -> f64 {
        q.as_decimal()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MILLI_PER_UNIT as u64;
        write!(f, "{}{}.{:03}", sign, abs / per, abs % per)
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_and_milli() {
        assert_eq!(Quantity::from_units(3).milli(), 3000);
        assert_eq!(Quantity::from_milli(1235).milli(), 1235);
        assert!(Quantity::zero().is_zero());
        assert!((-Quantity::from_units(1)).is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_milli(1235).to_string(), "1.235");
        assert_eq!(Quantity::from_units(2).to_string(), "2.000");
        assert_eq!(Quantity::from_milli(-500).to_string(), "-0.500");
    }

    #[test]
    fn test_json_boundary() {
        let q: Quantity = serde_json::from_str("1.5").unwrap();
        assert_eq!(q.milli(), 1500);

        let q: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(q, Quantity::from_units(2));

        assert_eq!(
            serde_json::to_string(&Quantity::from_milli(250)).unwrap(),
            "0.25"
        );
    }

    #[test]
    fn test_from_decimal_rounds_to_thousandths() {
        assert_eq!(Quantity::from_decimal(0.1 + 0.2).unwrap().milli(), 300);
        assert_eq!(Quantity::from_decimal(1.2346).unwrap().milli(), 1235);
        assert!(Quantity::from_decimal(f64::INFINITY).is_none());
    }

    #[test]
    fn test_non_finite_decimal_is_range_error() {
        let err = Quantity::try_from(f64::NAN).unwrap_err();
        assert_eq!(err, QuantityRangeError);
        assert_eq!(err.to_string(), "quantity must be a finite number");

        let parsed: Result<Quantity, _> = serde_json::from_str("1e400");
        assert!(parsed.is_err());
    }
}
