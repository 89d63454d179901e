//! # Ledger Error Types
//!
//! The error surface posting callers see. Wraps domain errors from
//! bazaar-core and persistence errors from bazaar-db, and adds the one
//! failure mode only this layer can observe: a concurrent write slipping in
//! between a read and its conditional update.

use thiserror::Error;

use bazaar_core::CoreError;
use bazaar_db::DbError;

/// Errors returned by posting services and read models.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Business rule violation (validation, missing entity, floor breach).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The record changed underneath the caller; the write was not applied.
    /// Retried once internally before surfacing.
    #[error("Concurrent modification of {entity} {id}")]
    ConcurrentModification { entity: String, id: String },

    /// Database failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
