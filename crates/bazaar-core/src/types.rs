//! # Domain Types
//!
//! Core domain types for the Bazaar ledger subsystem.
//!
//! ## Ledger Entities
//! - [`Product`] and [`Merchant`]: external aggregates of which the ledger
//!   owns exactly one mutable field each (`inventory_quantity`,
//!   `current_balance_paisa`)
//! - [`StockAdjustment`]: append-only audit record for manual inventory changes
//! - [`Transaction`] / [`TransactionItem`]: append-only sale ledger
//! - [`Payout`]: payment record whose status transitions drive merchant
//!   balance mutations
//!
//! ## Dual-Key Identity Pattern
//! Every entity has an `id` (UUID v4 string, immutable, used for relations)
//! and, where applicable, a human-readable business key (`sku`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000. 500 bps = 5% (standard GST slab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Tax Configuration
// =============================================================================

/// Tax configuration supplied by the (external) settings layer.
///
/// Consumed by sale posting; never stored by this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Whether tax is charged at all.
    pub enabled: bool,
    /// Rate applied to the taxable base.
    pub rate: TaxRate,
    /// When true the order-level discount is subtracted from the subtotal
    /// before the rate is applied.
    pub apply_after_discount: bool,
}

impl Default for TaxConfig {
    /// Matches the reference defaults: 5% GST applied after discount.
    fn default() -> Self {
        TaxConfig {
            enabled: true,
            rate: TaxRate::from_bps(500),
            apply_after_discount: true,
        }
    }
}

impl TaxConfig {
    /// A configuration that charges no tax.
    pub const fn disabled() -> Self {
        TaxConfig {
            enabled: false,
            rate: TaxRate::zero(),
            apply_after_discount: true,
        }
    }
}

// =============================================================================
// Display Unit
// =============================================================================

/// Display unit for produce quantities.
///
/// Carried through postings and snapshots; never interpreted numerically by
/// the ledger (3 kg and 3 dozen are both "quantity 3").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Piece,
    Dozen,
    Gram,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Owned by the (out of scope) catalog layer. The ledger reads price, unit and
/// shelf life, and mutates exactly one field: `inventory_quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on receipts and reports.
    pub name: String,

    /// Category used for grouped reporting.
    pub category: String,

    /// Display unit for quantities.
    pub unit: Unit,

    /// Regular price in paisa.
    pub price_paisa: i64,

    /// Current on-hand quantity. Non-negative invariant enforced by the
    /// inventory ledger.
    pub inventory_quantity: i64,

    /// Days until expiry, counted from `created_at`. None for non-perishables.
    pub shelf_life_days: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paisa(self.price_paisa)
    }
}

// =============================================================================
// Merchant
// =============================================================================

/// A supplier merchant.
///
/// Owned by the (out of scope) merchant directory. The ledger mutates exactly
/// one field: `current_balance_paisa`, the amount currently owed to the
/// merchant. Bank and contact details are carried through uninterpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_ifsc_code: Option<String>,

    /// Amount currently owed to the merchant, in paisa. Signed: completed
    /// payouts can take it below the baseline.
    pub current_balance_paisa: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Merchant {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn current_balance(&self) -> Money {
        Money::from_paisa(self.current_balance_paisa)
    }
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// Direction of a manual inventory change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Addition,
    Reduction,
}

/// Why inventory changed outside of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    Purchase,
    Return,
    Damaged,
    Expired,
    Theft,
    Correction,
    Other,
}

impl AdjustmentReason {
    /// Reasons that count as waste in the turnover report.
    #[inline]
    pub const fn is_waste(&self) -> bool {
        matches!(self, AdjustmentReason::Damaged | AdjustmentReason::Expired)
    }
}

/// An immutable record of a manual inventory change.
///
/// Once created a StockAdjustment is never edited or deleted. It is the audit
/// trail for every inventory change outside a sale, and a row exists only when
/// the corresponding inventory delta actually landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: String,
    pub product_id: String,
    pub kind: AdjustmentKind,
    /// Always positive; the sign is implied by `kind`.
    pub quantity: i64,
    pub unit: Unit,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    /// Acting user (external identity provider).
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl StockAdjustment {
    /// The signed inventory delta this adjustment represents.
    #[inline]
    pub fn signed_delta(&self) -> i64 {
        match self.kind {
            AdjustmentKind::Addition => self.quantity,
            AdjustmentKind::Reduction => -self.quantity,
        }
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// How a sale was paid. Descriptive only; no ledger math depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Credit,
}

/// Settlement state of a sale. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Partial,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

/// A completed sale. Immutable once posted, as is its effect on inventory.
///
/// Invariant at creation: `total = subtotal + tax - discount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Acting user (external identity provider).
    pub operator: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    /// Sum of line totals.
    pub subtotal_paisa: i64,
    /// Order-level discount, subtracted after the subtotal.
    pub discount_paisa: i64,
    pub tax_paisa: i64,
    pub total_paisa: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paisa(self.subtotal_paisa)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paisa(self.total_paisa)
    }
}

/// A line item in a sale.
///
/// Uses the snapshot pattern: name, unit and price are frozen at posting time
/// and never re-read from the catalog, so historical sales stay stable when
/// the catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub unit: Unit,
    pub quantity: i64,
    /// Unit price in paisa at time of sale (frozen).
    pub unit_price_paisa: i64,
    /// Per-unit discount in paisa.
    pub discount_paisa: i64,
    /// quantity * (unit_price - discount).
    pub line_total_paisa: i64,
    /// Zero-based position preserving the posted item order.
    pub position: i64,
}

impl TransactionItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paisa(self.unit_price_paisa)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paisa(self.line_total_paisa)
    }
}

// =============================================================================
// Payout
// =============================================================================

/// Settlement state of a payout.
///
/// The only mutable field on a payout with a ledger side effect: every
/// transition into or out of `Completed` fires exactly one merchant balance
/// adjustment. Any state may transition to any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Completed,
    Failed,
}

impl Default for PayoutStatus {
    /// The reference schema defaults new payouts to completed.
    fn default() -> Self {
        PayoutStatus::Completed
    }
}

/// How a payout was made. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    Cash,
    BankTransfer,
    Check,
    Upi,
}

/// A payment to a merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payout {
    pub id: String,
    pub merchant_id: String,
    /// Always positive.
    pub amount_paisa: i64,
    pub date: DateTime<Utc>,
    pub method: PayoutMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub status: PayoutStatus,
    /// Acting user (external identity provider).
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payout {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paisa(self.amount_paisa)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(500);
        assert_eq!(rate.bps(), 500);
        assert!((rate.percentage() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_tax_config_default() {
        let cfg = TaxConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.rate.bps(), 500);
        assert!(cfg.apply_after_discount);
    }

    #[test]
    fn test_payout_status_default() {
        assert_eq!(PayoutStatus::default(), PayoutStatus::Completed);
    }

    #[test]
    fn test_adjustment_signed_delta() {
        let mut adj = StockAdjustment {
            id: "a".into(),
            product_id: "p".into(),
            kind: AdjustmentKind::Addition,
            quantity: 4,
            unit: Unit::Kg,
            reason: AdjustmentReason::Purchase,
            notes: None,
            created_by: "u".into(),
            created_at: Utc::now(),
        };
        assert_eq!(adj.signed_delta(), 4);

        adj.kind = AdjustmentKind::Reduction;
        assert_eq!(adj.signed_delta(), -4);
    }

    #[test]
    fn test_waste_reasons() {
        assert!(AdjustmentReason::Damaged.is_waste());
        assert!(AdjustmentReason::Expired.is_waste());
        assert!(!AdjustmentReason::Theft.is_waste());
        assert!(!AdjustmentReason::Purchase.is_waste());
    }
}
