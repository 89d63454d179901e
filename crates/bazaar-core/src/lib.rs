//! # bazaar-core: Pure Business Logic for the Bazaar Ledger
//!
//! This crate is the heart of the ledger subsystem. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! bazaar-ledger (posting services, read models)
//!       │
//!       ▼
//! bazaar-core (THIS CRATE)          bazaar-db (SQLite persistence)
//!   types · money · pricing           pool · migrations · repositories
//!   payout transitions · turnover
//!
//!   NO I/O - NO DATABASE - NO NETWORK - PURE FUNCTIONS
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Merchant, Transaction, Payout, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Sale total computation
//! - [`payout`] - Payout status transition effects on merchant balances
//! - [`turnover`] - Turnover and expiry math for the read models
//! - [`error`] - Domain error types
//! - [`validation`] - Posting input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are paisa (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod payout;
pub mod pricing;
pub mod turnover;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payout::BalanceEffect;
pub use pricing::{compute_totals, SaleLine, SaleTotals};
pub use turnover::{compute_turnover, TurnoverReport};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products at or below this on-hand quantity count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Look-ahead window for the expiring-soon read model, in days.
pub const EXPIRY_WINDOW_DAYS: i64 = 7;

/// Trailing window for the inventory turnover report, in days.
pub const TURNOVER_WINDOW_DAYS: i64 = 30;
