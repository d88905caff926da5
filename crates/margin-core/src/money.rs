//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling monetary values and
//! rates safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 12% commission on R$ 150.00 computed in floats drifts by fractions  │
//! │  of a cent, and the drift compounds once it is subtracted from profit. │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    15000 cents × 1200 bps = 18_000_000 (exact, scale 1/10000 cent)      │
//! │    Round ONCE at the boundary → 1800 cents                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use margin_core::money::{Money, Percent};
//!
//! let received = Money::from_cents(15000); // 150.00
//! let commission = Percent::from_bps(1200); // 12.00%
//!
//! let exact = received.scaled_percentage(commission); // 18_000_000
//! assert_eq!(Money::from_scaled(exact).cents(), 1800);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Scale of an exact `cents × bps` product: one cent is 10_000 units.
pub const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Rounding
// =============================================================================

/// Divides and rounds half away from zero.
///
/// This is the "standard" decimal rounding used for every stored figure:
/// `0.825 → 0.83`, `-1.505 → -1.51`.
///
/// ## Example
/// ```rust
/// use margin_core::money::div_round_half_up;
///
/// assert_eq!(div_round_half_up(8_250, 10_000), 1);
/// assert_eq!(div_round_half_up(-15_000, 10_000), -2);
/// assert_eq!(div_round_half_up(14_999, 10_000), 1);
/// ```
pub fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator != 0, "division by zero");

    let negative = (numerator < 0) != (denominator < 0);
    let (n, d) = (numerator.abs(), denominator.abs());
    let quotient = (n + d / 2) / d;

    if negative {
        -quotient
    } else {
        quotient
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Net profit can be negative; inputs are validated
///   non-negative at the calculator boundary instead of in the type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as integer cents**: The wire never carries floats
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sale.amount_received ──┬──► platform fee total ──┐                     │
/// │  Sale.printing_cost ────┤                         ├──► net profit       │
/// │  Sale.shipping_cost ────┘                         │                     │
/// │  Platform.fixed_fee ──────────────────────────────┘                     │
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
    /// use margin_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
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

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the value at [`BPS_SCALE`] without any rounding.
    #[inline]
    pub const fn scaled(&self) -> i128 {
        self.0 as i128 * BPS_SCALE
    }

    /// Returns `self × rate` at [`BPS_SCALE`] without any rounding.
    ///
    /// Used when a percentage-based figure feeds into another calculation
    /// and must not be rounded first.
    #[inline]
    pub const fn scaled_percentage(&self, rate: Percent) -> i128 {
        self.0 as i128 * rate.bps() as i128
    }

    /// Rounds a [`BPS_SCALE`] value to whole cents (half away from zero).
    ///
    /// The result must fit in `i64`; inputs validated against
    /// [`MAX_MONEY_CENTS`](crate::MAX_MONEY_CENTS) always do.
    #[inline]
    pub fn from_scaled(scaled: i128) -> Self {
        Money(div_round_half_up(scaled, BPS_SCALE) as i64)
    }

}

/// Display shows money with two decimals, no currency symbol.
///
/// ## Note
/// This is for logs and debugging. The browser UI formats for display.
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points of a percent.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1200 bps = 12.00% (a typical marketplace commission)
///
/// Signed, because a profit margin can be negative (`-500` = -5.00%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(i64);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percent(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `part / whole` as a percentage, rounded to whole basis points.
    ///
    /// Returns zero when `whole` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use margin_core::money::{Money, Percent};
    ///
    /// let ratio = Percent::ratio(Money::from_cents(8200), Money::from_cents(15000));
    /// assert_eq!(ratio.bps(), 5467); // 54.67%
    /// ```
    pub fn ratio(part: Money, whole: Money) -> Self {
        if whole.is_zero() {
            return Percent::zero();
        }

        Percent(div_round_half_up(part.cents() as i128 * BPS_SCALE, whole.cents() as i128) as i64)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
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
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Percent::from_bps(5467).to_string(), "54.67%");
        assert_eq!(Percent::from_bps(-500).to_string(), "-5.00%");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(div_round_half_up(5, 10), 1);
        assert_eq!(div_round_half_up(4, 10), 0);
        assert_eq!(div_round_half_up(-5, 10), -1);
        assert_eq!(div_round_half_up(-4, 10), 0);
        assert_eq!(div_round_half_up(5, -10), -1);
        assert_eq!(div_round_half_up(0, 7), 0);
    }

    #[test]
    fn test_percentage_rounds_once() {
        // Unrounded product keeps the fraction of a cent
        let exact = Money::from_cents(1000).scaled_percentage(Percent::from_bps(825));
        assert_eq!(exact, 8_250_000);

        // 10.00 at 8.25% = 0.825 → 0.83
        assert_eq!(Money::from_scaled(exact).cents(), 83);

        // 150.00 at 12% = 18.00 exactly
        let exact = Money::from_cents(15000).scaled_percentage(Percent::from_bps(1200));
        assert_eq!(Money::from_scaled(exact).cents(), 1800);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(Percent::ratio(Money::from_cents(8200), Money::from_cents(15000)).bps(), 5467);
        assert_eq!(Percent::ratio(Money::from_cents(-150), Money::from_cents(3000)).bps(), -500);
        assert_eq!(Percent::ratio(Money::from_cents(1234), Money::zero()), Percent::zero());
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Money::from_cents(8200)).unwrap(), "8200");
        assert_eq!(serde_json::to_string(&Percent::from_bps(-500)).unwrap(), "-500");
    }
}
