//! # Validation Module
//!
//! Invariant checks for carts that did not come out of [`Cart::apply`].
//!
//! Transitions preserve the invariants by construction. A cart read back
//! from storage has no such guarantee: the value may have been written by an
//! older client or edited by hand, so it is checked before it replaces the
//! in-memory state.
//!
//! [`Cart::apply`]: crate::Cart::apply

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::CartItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line quantity (must be at least 1).
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a whole cart.
///
/// ## Rules
/// - Every quantity is at least 1
/// - No id appears twice
///
/// Ids are not checked beyond uniqueness; the empty string is a valid id.
pub fn validate_cart(items: &[CartItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_quantity(item.quantity)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewCartItem;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_validate_cart_accepts_valid() {
        let items = vec![
            NewCartItem::new("a", "A", "", 1.0).with_quantity(1),
            NewCartItem::new("b", "B", "", 2.0).with_quantity(7),
        ];
        assert!(validate_cart(&items).is_ok());
        assert!(validate_cart(&[]).is_ok());
    }

    #[test]
    fn test_validate_cart_rejects_duplicate() {
        let items = vec![
            NewCartItem::new("a", "A", "", 1.0).with_quantity(1),
            NewCartItem::new("a", "A again", "", 1.0).with_quantity(1),
        ];
        let err = validate_cart(&items).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { ref value, .. } if value == "a"));
    }

    #[test]
    fn test_validate_cart_accepts_blank_id() {
        let items = vec![NewCartItem::new("", "Blank", "", 1.0).with_quantity(1)];
        assert!(validate_cart(&items).is_ok());

        let items = vec![
            NewCartItem::new("", "Blank", "", 1.0).with_quantity(1),
            NewCartItem::new("", "Blank", "", 1.0).with_quantity(2),
        ];
        assert!(matches!(
            validate_cart(&items),
            Err(ValidationError::Duplicate { .. })
        ));
    }
}
