//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, and
//! `ExactAmount` for the sub-cent intermediate figures of discount and tax
//! math.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    29.99 × 3 = 89.97000000000001  ❌ WRONG!                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    2999 cents × 3 = 8997 cents                                          │
//! │                                                                         │
//! │  Discounts produce fractions of a cent (199.99 × 3 × 50% = 299.985).   │
//! │  Those are carried exactly in ExactAmount and rounded ONCE at the end. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_cents(2999); // $29.99
//! let pair = price.checked_add(price);  // $59.98
//! assert_eq!(pair, Some(Money::from_cents(5998)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::types::Percentage;
use crate::validation::ValidationResult;

/// Basis points in 100%.
const BPS_PER_UNIT: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a caller may pass a negative threshold, which must be
///   representable to be rejected by validation
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Checked arithmetic only**: a cart total can leave the i64 range;
///   overflow surfaces as `None`, never wraps or panics
///
/// ## Where Money is Used
/// ```text
/// Product.unit_price ──► Cart.marked_price ──► Cart.discount
///                                                   │
///                                                   ▼
///              Cart.total_price ◄── Cart.tax_amount ◄── Cart.price_before_tax
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Highest unit price a product may carry: $1,000,000,000.00.
    pub const MAX_UNIT_PRICE: Money = Money(100_000_000_000);

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount read from configuration into Money.
    ///
    /// This is the only float entry point and is meant for boundary values
    /// such as `unit_price = 29.99` in a config file; no arithmetic is ever
    /// done on the float. The amount must be finite and a whole number of
    /// cents; `field` names the value in the error.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_decimal("Unit price", 29.99)?.cents(), 2999);
    /// assert!(Money::try_from_decimal("Unit price", 29.999).is_err());
    /// assert!(Money::try_from_decimal("Unit price", f64::NAN).is_err());
    /// # Ok::<(), tally_core::ValidationError>(())
    /// ```
    pub fn try_from_decimal(field: &str, amount: f64) -> ValidationResult<Self> {
        scale_decimal(amount, 100.0)
            .map(Money)
            .ok_or_else(|| ValidationError::Unrepresentable {
                field: field.to_string(),
                unit: "cents".to_string(),
                value: amount.to_string(),
            })
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Addition, `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtraction, `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Applies a percentage and rounds the result to whole cents.
    ///
    /// ## Rounding
    /// Round half away from zero: $10.00 × 8.25% = $0.825 → $0.83.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::Percentage;
    ///
    /// let price = Money::from_cents(1000);
    /// let tax = price.checked_percent(Percentage::from_bps(825));
    /// assert_eq!(tax, Some(Money::from_cents(83)));
    /// ```
    pub fn checked_percent(self, rate: Percentage) -> Option<Money> {
        ExactAmount::from(self).checked_percent(rate)?.round_to_cents()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and error messages, not localized UI output.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Exact Amount
// =============================================================================

/// A monetary amount with sub-cent precision.
///
/// Stored as cents × 10^8, i.e. enough resolution for two successive
/// basis-point rates (10^4 × 10^4) without any loss. Discount math chains at
/// most two rates (product offer, then global rate on the remainder), so
/// every intermediate figure is exact and rounding happens once, in
/// [`ExactAmount::round_to_cents`].
///
/// All arithmetic is checked; `None` means the figure left the
/// representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ExactAmount(i128);

impl ExactAmount {
    /// Units per cent.
    const SCALE: i128 = BPS_PER_UNIT * BPS_PER_UNIT;

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        ExactAmount(0)
    }

    #[inline]
    pub fn checked_add(self, other: ExactAmount) -> Option<ExactAmount> {
        self.0.checked_add(other.0).map(ExactAmount)
    }

    #[inline]
    pub fn checked_sub(self, other: ExactAmount) -> Option<ExactAmount> {
        self.0.checked_sub(other.0).map(ExactAmount)
    }

    /// Multiplies by a unit count.
    #[inline]
    pub fn checked_mul_quantity(self, qty: i64) -> Option<ExactAmount> {
        self.0.checked_mul(qty as i128).map(ExactAmount)
    }

    /// Applies a percentage to this amount.
    ///
    /// Exact whenever `self` carries at most one prior rate application,
    /// which is the deepest chain pricing ever builds. Deeper chains round
    /// the last sub-unit half away from zero.
    pub fn checked_percent(self, rate: Percentage) -> Option<ExactAmount> {
        let scaled = self.0.checked_mul(rate.bps() as i128)?;
        Some(ExactAmount(div_round_half_away(scaled, BPS_PER_UNIT)))
    }

    /// Rounds to whole cents, half away from zero. `None` if the result
    /// does not fit in `Money`.
    ///
    /// ```rust
    /// use tally_core::money::{ExactAmount, Money};
    /// use tally_core::types::Percentage;
    ///
    /// // $199.99 × 50% = $99.995 → $100.00
    /// let half = ExactAmount::from(Money::from_cents(19999)).checked_percent(Percentage::from_bps(5000));
    /// assert_eq!(half.and_then(|h| h.round_to_cents()), Some(Money::from_cents(10000)));
    /// ```
    pub fn round_to_cents(&self) -> Option<Money> {
        i64::try_from(div_round_half_away(self.0, Self::SCALE))
            .ok()
            .map(Money::from_cents)
    }
}

impl From<Money> for ExactAmount {
    fn from(money: Money) -> Self {
        ExactAmount(money.cents() as i128 * Self::SCALE)
    }
}

/// Integer division rounding half away from zero. `divisor` must be positive.
fn div_round_half_away(value: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        -((-value + half) / divisor)
    }
}

/// Converts a decimal to an integer count of `1 / scale` units.
///
/// `None` for non-finite input, for values outside ±9×10^18 units, and for
/// values carrying a fraction of a unit beyond float noise.
pub(crate) fn scale_decimal(value: f64, scale: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let scaled = value * scale;
    let whole = scaled.round();
    let noise = (scaled.abs() * 4.0 * f64::EPSILON).max(1e-6);
    if (scaled - whole).abs() > noise || whole.abs() > 9.0e18 {
        return None;
    }
    Some(whole as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================
