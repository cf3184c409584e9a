//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Catalog conversion and snapshot consistency    │
//! │  └── ValidationError  - Field-level validation failures                │
//! │                                                                         │
//! │  storefront-store errors (separate crate)                              │
//! │  └── StoreError       - Durable storage failures                       │
//! │                                                                         │
//! │  storefront-session errors                                             │
//! │  └── SessionError     - Config loading, session startup                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart actions themselves never fail: mutating an absent line is a no-op,
//! so nothing in [`crate::cart`] returns these errors.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A catalog entry could not be turned into a cart product.
    ///
    /// ## When This Occurs
    /// - Display price is missing or not a number (`"Call for price"`)
    /// - Product id is blank
    #[error("Catalog entry '{product_id}' is not purchasable: {reason}")]
    InvalidCatalogEntry { product_id: String, reason: String },

    /// A cart snapshot breaks one of the cart invariants.
    ///
    /// ## When This Occurs
    /// - Stored subtotal/item count disagree with the stored lines
    /// - Duplicate line ids or zero-quantity lines in a stored record
    /// - Line totals too large to add up
    #[error("Inconsistent cart snapshot: {0}")]
    InconsistentSnapshot(#[source] ValidationError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation errors.
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

    /// Invalid format (e.g., unparseable price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two lines with the same id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A total does not fit in the amount type.
    #[error("{field} overflows")]
    Overflow { field: String },

    /// A stored aggregate disagrees with the value derived from the lines.
    #[error("{field} is {stored} but lines add up to {derived}")]
    Mismatch {
        field: String,
        stored: i64,
        derived: i64,
    },
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
        let err = CoreError::InvalidCatalogEntry {
            product_id: "7".to_string(),
            reason: "price missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Catalog entry '7' is not purchasable: price missing"
        );
    }

    #[test]
    fn test_mismatch_message() {
        let err = ValidationError::Mismatch {
            field: "subtotal".to_string(),
            stored: 100,
            derived: 35,
        };
        assert_eq!(err.to_string(), "subtotal is 100 but lines add up to 35");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
