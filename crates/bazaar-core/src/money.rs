//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! In floating point, `0.1 + 0.2 = 0.30000000000000004`. Over thousands of
//! sale postings that error compounds into real missing paisa. Every monetary
//! value in the system is therefore an integer count of the smallest currency
//! unit (paisa). Only the UI converts to rupees for display.
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! // Create from paisa (preferred)
//! let price = Money::from_paisa(5000); // Rs 50.00
//!
//! // Arithmetic operations
//! let line = price.multiply_quantity(3); // Rs 150.00
//! assert_eq!(line.paisa(), 15000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in paisa (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: merchant balances and order-level discounts can be
///   negative or push intermediate values below zero
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paisa (the smallest currency unit).
    #[inline]
    pub const fn from_paisa(paisa: i64) -> Self {
        Money(paisa)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paisa.
    #[inline]
    pub const fn paisa(&self) -> i64 {
        self.0
    }

    /// Returns the rupee (major unit) portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paisa (minor unit) portion, always 0-99.
    #[inline]
    pub const fn paisa_part(&self) -> i64 {
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the negated value.
    #[inline]
    pub const fn negate(&self) -> Self {
        Money(-self.0)
    }

    /// Calculates tax on this amount.
    ///
    /// Uses integer math with half-up rounding:
    /// `(amount * bps + 5000) / 10000`. The +5000 rounds the half-paisa
    /// boundary up instead of truncating, so tax totals never drift low.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::TaxRate;
    ///
    /// let base = Money::from_paisa(15000); // Rs 150.00
    /// let rate = TaxRate::from_bps(500);   // 5% GST
    /// assert_eq!(base.calculate_tax(rate).paisa(), 750); // Rs 7.50
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 intermediate prevents overflow on large amounts
        let tax_paisa = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paisa(tax_paisa as i64)
    }

    /// Multiplies money by a quantity (line total calculation).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
/// For debugging; actual receipts format amounts in the excluded UI layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rs {}.{:02}", sign, self.rupees().abs(), self.paisa_part())
    }
}

/// Default money is zero.
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
