//! # bazaar-db: Database Layer for the Bazaar Ledger
//!
//! SQLite persistence for the ledger subsystem, built on sqlx with async
//! pooling and embedded migrations.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  Bazaar Ledger Data Flow                   │
//! │                                                            │
//! │  Service call (post_sale, post_adjustment, ...)            │
//! │       │                                                    │
//! │       ▼                                                    │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │               bazaar-db (THIS CRATE)                 │  │
//! │  │                                                      │  │
//! │  │  ┌────────────┐   ┌───────────────┐  ┌────────────┐  │  │
//! │  │  │  Database  │   │  Repositories │  │ Migrations │  │  │
//! │  │  │  (pool.rs) │◄──│  (product,    │  │ (embedded) │  │  │
//! │  │  │            │   │   merchant,   │  │            │  │  │
//! │  │  │ SqlitePool │   │   sale, ...)  │  │ 001_initial│  │  │
//! │  │  └────────────┘   └───────────────┘  └────────────┘  │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │       │                                                    │
//! │       ▼                                                    │
//! │                   SQLite Database (WAL)                    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, merchant, sale,
//!   adjustment, payout)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/bazaar.db")).await?;
//!
//! let product = db.products().get_by_id("uuid-here").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Public Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    AdjustmentRepository, DeltaOutcome, MerchantRepository, PayoutRepository, ProductRepository,
    SaleRepository,
};
