//! # Error Types
//!
//! Domain-specific error types for cart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cart-core errors (this file)                                          │
//! │  ├── CoreError        - Wire format and domain failures                │
//! │  └── ValidationError  - Cart invariant violations                      │
//! │                                                                         │
//! │  cart-store errors (separate crate)                                    │
//! │  ├── KvError          - Key-value store failures                       │
//! │  └── StoreError       - What store consumers see                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → host                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart transitions themselves never fail: an unknown id is a valid no-op.
//! Errors only arise when a cart comes back from storage.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cart errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Persisted cart text is not a JSON array of cart items.
    ///
    /// ## When This Occurs
    /// - Stored value was truncated or hand-edited
    /// - A field has the wrong type (e.g. `"quantity": "two"`)
    /// - A required field is missing
    #[error("Malformed cart data: {0}")]
    Malformed(String),

    /// Decoded cart breaks an invariant (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Malformed(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Cart invariant violations.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Duplicate value (e.g., two lines for the same product id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
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
    fn test_validation_error_messages() {
        let err = ValidationError::Duplicate {
            field: "id".to_string(),
            value: "a".to_string(),
        };
        assert_eq!(err.to_string(), "id 'a' already exists");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_json_error_becomes_malformed() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::Malformed(_)));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
