//! # bazaar-ledger: Posting Services and Read Models
//!
//! The consistency layer of the Bazaar retail system. Every inventory and
//! merchant-balance mutation flows through the posting services here; the
//! read models aggregate what those postings produced.
//!
//! ## Architecture Position
//! ```text
//! Caller (API handler, desktop command, job)
//!       │
//!       ▼
//! bazaar-ledger (THIS CRATE)
//!   InventoryService · SalesService · PayoutService · ReportService
//!       │
//!       ▼
//! bazaar-db (repositories, conditional SQL updates)
//!       │
//!       ▼
//! SQLite (WAL)
//! ```
//!
//! ## Ledger Rules
//! - Quantities and balances move by signed deltas, never absolute writes
//! - On-hand quantity never goes below zero (floor checked in SQL)
//! - Sales and adjustments are append-only once posted
//! - Payout status transitions across the completed boundary fire exactly
//!   one merchant balance delta each
//!
//! ## Usage
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//! use bazaar_ledger::Ledger;
//!
//! let db = Database::new(DbConfig::new("./bazaar.db")).await?;
//! let ledger = Ledger::new(db);
//!
//! let sale = ledger.sales().post_sale(new_sale, &tax_config).await?;
//! let report = ledger.reports().inventory_turnover().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod payouts;
pub mod reports;
pub mod sales;

// =============================================================================
// Public Re-exports
// =============================================================================

pub use error::{LedgerError, LedgerResult};
pub use inventory::{InventoryService, NewAdjustment};
pub use payouts::{NewPayout, PayoutPatch, PayoutService};
pub use reports::{ExpiringProduct, InventoryStats, ReportService};
pub use sales::{NewSale, NewSaleItem, SalesService};

use bazaar_db::Database;

/// Facade bundling the four services over one database handle.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
}

impl Ledger {
    /// Creates the ledger facade.
    pub fn new(db: Database) -> Self {
        Ledger { db }
    }

    /// Manual stock adjustments.
    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.db.clone())
    }

    /// Sale postings.
    pub fn sales(&self) -> SalesService {
        SalesService::new(self.db.clone())
    }

    /// Payout lifecycle and merchant balances.
    pub fn payouts(&self) -> PayoutService {
        PayoutService::new(self.db.clone())
    }

    /// Inventory read models.
    pub fn reports(&self) -> ReportService {
        ReportService::new(self.db.clone())
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }
}
