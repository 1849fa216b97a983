//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Weighed goods make it worse:                                           │
//! │    89.90/kg × 1.235 kg = 111.0265  → what goes on the receipt?         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents × Integer Grams                            │
//! │    8990 × 1235 / 1000 = 11102.65 → 11103 cents (half up, once)         │
//! │    Rounding happens in exactly one place: Money::times                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::quantity::Quantity;
//!
//! let price = Money::from_cents(8990); // 89.90
//!
//! let line = price.times(Quantity::from_units(2));
//! assert_eq!(line.cents(), 17980);
//!
//! let total = line + Money::from_cents(1200);
//! assert_eq!(total.cents(), 19180);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::{Quantity, MILLI_PER_UNIT};

/// Largest amount a price, fee or sale total may carry: 100 million in
/// major units. Keeps every stored total far from the i64 edge.
pub const MAX_MONEY_CENTS: i64 = 10_000_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Fee corrections and adjustments may be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Product.price_cents ──┬──► effective_price ──► PricedLine.subtotal    │
/// │  Product.promo_cents ──┘                              │                 │
/// │                                                       ▼                 │
/// │              delivery_fee ──────────────────► PricedBasket.total       │
/// │                                                       │                 │
/// │                                                       ▼                 │
/// │                              Sale.total_amount_cents (stored, fixed)   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(3490); // Represents 34.90
    /// assert_eq!(price.cents(), 3490);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
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

    /// Multiplies a unit price by a quantity, rounding half away from zero.
    /// Saturates at the i64 bounds.
    ///
    /// ## Implementation
    /// Quantities are thousandths of a unit, so the raw product is in
    /// thousandths of a cent: `(cents * milli ± 500) / 1000`.
    /// i128 keeps large totals from overflowing mid-computation.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::quantity::Quantity;
    ///
    /// let per_kg = Money::from_cents(8990);
    ///
    /// // Whole units are exact
    /// assert_eq!(per_kg.times(Quantity::from_units(3)).cents(), 26970);
    ///
    /// // 1.235 kg = 111.0265 → 111.03
    /// assert_eq!(per_kg.times(Quantity::from_milli(1235)).cents(), 11103);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Scale reads: 1.235 kg of Picanha (89.90/kg)
    ///      │
    ///      ▼
    /// times(1235) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line subtotal: 111.03
    /// ```
    pub fn times(&self, quantity: Quantity) -> Money {
        let rounded = self.times_wide(quantity);
        let clamped = rounded.clamp(i64::MIN as i128, i64::MAX as i128);
        Money::from_cents(clamped as i64)
    }

    /// Like [`Money::times`], but `None` when the result leaves the i64 range.
    /// Pricing goes through this one.
    pub fn checked_times(&self, quantity: Quantity) -> Option<Money> {
        i64::try_from(self.times_wide(quantity))
            .ok()
            .map(Money::from_cents)
    }

    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    fn times_wide(&self, quantity: Quantity) -> i128 {
        let raw = self.0 as i128 * quantity.milli() as i128;
        let half = (MILLI_PER_UNIT / 2) as i128;
        if raw >= 0 {
            (raw + half) / MILLI_PER_UNIT as i128
        } else {
            (raw - half) / MILLI_PER_UNIT as i128
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented rendering. Localized formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(8990);
        assert_eq!(money.cents(), 8990);
        assert_eq!(money.major(), 89);
        assert_eq!(money.minor(), 90);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(34, 90).cents(), 3490);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(17980)), "179.80");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::zero()), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(5000);
        let b = Money::from_cents(1200);

        assert_eq!((a + b).cents(), 6200);
        assert_eq!((a - b).cents(), 3800);

        let mut c = a;
        c += b;
        c -= Money::from_cents(200);
        assert_eq!(c.cents(), 6000);
    }

    #[test]
    fn test_sum() {
        let lines = vec![
            Money::from_cents(17980),
            Money::from_cents(10470),
            Money::from_cents(1500),
        ];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.cents(), 29950);
    }

    #[test]
    fn test_times_whole_units_is_exact() {
        assert_eq!(
            Money::from_cents(8990).times(Quantity::from_units(2)).cents(),
            17980
        );
        assert_eq!(
            Money::from_cents(3490).times(Quantity::from_units(3)).cents(),
            10470
        );
    }

    #[test]
    fn test_times_weight_rounds_half_up() {
        // 24.90/kg × 0.500 kg = 12.45 exactly
        assert_eq!(
            Money::from_cents(2490).times(Quantity::from_milli(500)).cents(),
            1245
        );
        // 0.01 × 0.500 = 0.005 → 0.01
        assert_eq!(
            Money::from_cents(1).times(Quantity::from_milli(500)).cents(),
            1
        );
        // 0.01 × 0.499 = 0.00499 → 0.00
        assert_eq!(
            Money::from_cents(1).times(Quantity::from_milli(499)).cents(),
            0
        );
    }

    #[test]
    fn test_times_negative_rounds_away_from_zero() {
        assert_eq!(
            Money::from_cents(-1).times(Quantity::from_milli(500)).cents(),
            -1
        );
    }

    #[test]
    fn test_times_large_values_do_not_overflow() {
        let price = Money::from_cents(1_000_000_000);
        let qty = Quantity::from_units(999);
        assert_eq!(price.times(qty).cents(), 999_000_000_000);
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        assert_eq!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)),
            None
        );
        assert_eq!(
            Money::from_cents(5000).checked_add(Money::from_cents(1200)),
            Some(Money::from_cents(6200))
        );

        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.checked_times(Quantity::from_units(3)), None);
        assert_eq!(huge.times(Quantity::from_units(3)).cents(), i64::MAX);
        assert_eq!(
            Money::from_cents(2490).checked_times(Quantity::from_milli(750)),
            Some(Money::from_cents(1868))
        );
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
        assert_eq!(Money::default(), Money::zero());
    }
}
