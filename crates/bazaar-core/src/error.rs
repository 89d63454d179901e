//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! bazaar-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! bazaar-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! bazaar-ledger errors (separate crate)
//! └── LedgerError      - What posting callers see
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (IDs, quantities)
//! 3. Errors are enum variants, never String
//! 4. Validation failures are never partially applied

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations and are always raised before any
/// state change, or instead of one.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist (or was soft-deleted).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced merchant does not exist.
    #[error("Merchant not found: {0}")]
    MerchantNotFound(String),

    /// Referenced payout does not exist.
    #[error("Payout not found: {0}")]
    PayoutNotFound(String),

    /// A reduction would drive on-hand quantity below zero.
    ///
    /// Raised strictly for adjustment postings; sale postings tolerate it
    /// per line item (see the sale ledger's failure policy).
    #[error("Insufficient inventory for {product_id}: available {available}, requested {requested}")]
    InsufficientInventory {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A sale posting with no line items.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs; caller must correct and retry.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientInventory {
            product_id: "TOMATO-1KG".to_string(),
            available: 10,
            requested: 15,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient inventory for TOMATO-1KG: available 10, requested 15"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "merchant_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
