//! # Repositories
//!
//! One repository per table, all cheap clones around the shared pool.
//! Mutations that carry ledger invariants (inventory floor, balance deltas,
//! conditional payout writes) live here as single SQL statements; the service
//! layer in bazaar-ledger composes them.

pub mod adjustment;
pub mod merchant;
pub mod payout;
pub mod product;
pub mod sale;

pub use adjustment::AdjustmentRepository;
pub use merchant::MerchantRepository;
pub use payout::PayoutRepository;
pub use product::{DeltaOutcome, ProductRepository};
pub use sale::SaleRepository;
