//! # Validation Module
//!
//! Input validation for ledger postings.
//!
//! ## Validation Strategy
//! Defense in depth: postings validate here before business logic runs, and
//! the database schema re-enforces the same rules with CHECK constraints.
//! Validation failures are never partially applied.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an adjustment or sale-line quantity.
///
/// ## Rules
/// - Must be positive (> 0); the sign of an adjustment lives in its kind,
///   never in the stored quantity
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price or discount in paisa.
///
/// Zero is allowed (free items, no discount); negative is not.
pub fn validate_price_paisa(paisa: i64) -> ValidationResult<()> {
    if paisa < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payout amount in paisa.
///
/// Must be strictly positive; a zero payout is meaningless and a negative one
/// would invert the balance trigger.
pub fn validate_payout_amount(paisa: i64) -> ValidationResult<()> {
    if paisa <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100_000).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price_paisa() {
        assert!(validate_price_paisa(0).is_ok());
        assert!(validate_price_paisa(5000).is_ok());
        assert!(validate_price_paisa(-100).is_err());
    }

    #[test]
    fn test_validate_payout_amount() {
        assert!(validate_payout_amount(20000).is_ok());
        assert!(validate_payout_amount(0).is_err());
        assert!(validate_payout_amount(-500).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
