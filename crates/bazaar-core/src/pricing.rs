//! # Sale Pricing
//!
//! Pure arithmetic for sale postings.
//!
//! ## Formula
//! ```text
//! line_total = quantity * (unit_price - unit_discount)
//! subtotal   = sum(line_total)
//! base       = subtotal - order_discount   (when tax applies after discount)
//!            = subtotal                    (otherwise)
//! tax        = base * rate                 (0 when tax is disabled)
//! total      = subtotal + tax - order_discount
//! ```
//!
//! The invariant `total == subtotal + tax - discount` holds by construction;
//! the sale ledger persists exactly these numbers.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TaxConfig;

// =============================================================================
// Sale Line
// =============================================================================

/// The priced portion of one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub quantity: i64,
    pub unit_price: Money,
    /// Per-unit discount, subtracted from the unit price before multiplying.
    pub unit_discount: Money,
}

impl SaleLine {
    pub fn new(quantity: i64, unit_price: Money, unit_discount: Money) -> Self {
        SaleLine {
            quantity,
            unit_price,
            unit_discount,
        }
    }

    /// quantity * (unit_price - unit_discount)
    #[inline]
    pub fn line_total(&self) -> Money {
        (self.unit_price - self.unit_discount).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// The computed money columns of a sale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    /// Order-level discount, echoed back for persistence.
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Computes the money columns for a sale posting.
///
/// The taxable base depends on the external tax configuration's
/// "apply after discount" setting; with it on, the order-level discount
/// shrinks the base before the rate is applied.
pub fn compute_totals(lines: &[SaleLine], order_discount: Money, tax_config: &TaxConfig) -> SaleTotals {
    let subtotal = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    let taxable_base = if tax_config.apply_after_discount {
        subtotal - order_discount
    } else {
        subtotal
    };

    let tax = if tax_config.enabled {
        taxable_base.calculate_tax(tax_config.rate)
    } else {
        Money::zero()
    };

    let total = subtotal + tax - order_discount;

    SaleTotals {
        subtotal,
        discount: order_discount,
        tax,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
