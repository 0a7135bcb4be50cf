//! # Cart
//!
//! The cart sequence and its transitions.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Transitions                                 │
//! │                                                                         │
//! │  Operation          Id in cart?      Result                CartChange   │
//! │  ─────────          ───────────      ──────                ──────────   │
//! │  Add(item)          -, price NaN/∞   unchanged             Unchanged    │
//! │  Add(item)          no               push item (qty 1)     Appended     │
//! │  Add(item)          yes              fields from item,     Updated      │
//! │                                      qty + 1, same slot                 │
//! │  Increment(id)      no               unchanged             Unchanged    │
//! │  Increment(id)      yes              qty + 1               Incremented  │
//! │  Decrement(id)      no               unchanged             Unchanged    │
//! │  Decrement(id)      yes, qty == 1    line removed          Removed      │
//! │  Decrement(id)      yes, qty > 1     qty - 1               Decremented  │
//! │                                                                         │
//! │  Every transition returns a NEW cart; the input is never modified.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::types::{CartItem, NewCartItem};
use crate::validation::validate_cart;

// =============================================================================
// Cart Operation
// =============================================================================

/// A cart mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum CartOp {
    /// Add one unit of a product, appending it if it is not in the cart yet.
    Add(NewCartItem),

    /// Add one unit to an existing line.
    Increment(String),

    /// Remove one unit from an existing line, dropping the line at zero.
    Decrement(String),
}

impl CartOp {
    /// Returns the product id the operation targets.
    pub fn id(&self) -> &str {
        match self {
            CartOp::Add(item) => &item.id,
            CartOp::Increment(id) | CartOp::Decrement(id) => id,
        }
    }

    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartOp::Add(_) => "add_to_cart",
            CartOp::Increment(_) => "increment",
            CartOp::Decrement(_) => "decrement",
        }
    }
}

/// What a transition did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was pushed to the end.
    Appended,

    /// An existing line took new display fields and gained one unit.
    Updated { quantity: u32 },

    /// An existing line gained one unit.
    Incremented { quantity: u32 },

    /// An existing line lost one unit.
    Decremented { quantity: u32 },

    /// A line with a single unit was removed.
    Removed,

    /// Nothing to do: the id was not in the cart, or an add carried a
    /// non-finite price.
    Unchanged,
}

impl CartChange {
    /// Returns true if the cart contents differ after the transition.
    pub fn is_change(&self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The ordered, unique-by-id list of cart lines.
///
/// Serializes as a bare JSON array of [`CartItem`], which is the persisted
/// wire format.
///
/// ## Invariants
/// - No two lines share an `id`
/// - Every line has `quantity >= 1`
/// - Appended lines go to the end; updated lines keep their position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from lines, checking the cart invariants.
    pub fn from_items(items: Vec<CartItem>) -> CoreResult<Self> {
        validate_cart(&items)?;
        Ok(Cart { items })
    }

    /// Applies an operation and returns the resulting cart.
    ///
    /// Pure: `self` is left as it was. Unknown ids are not errors, they
    /// produce an equal cart and [`CartChange::Unchanged`].
    pub fn apply(&self, op: &CartOp) -> (Cart, CartChange) {
        match op {
            CartOp::Add(item) => self.added(item),
            CartOp::Increment(id) => self.incremented(id),
            CartOp::Decrement(id) => self.decremented(id),
        }
    }

    fn added(&self, new_item: &NewCartItem) -> (Cart, CartChange) {
        // Non-finite prices have no JSON form
        if !new_item.price.is_finite() {
            return (self.clone(), CartChange::Unchanged);
        }

        let Some(existing) = self.get(&new_item.id) else {
            let mut items = self.items.clone();
            items.push(new_item.clone().with_quantity(1));
            return (Cart { items }, CartChange::Appended);
        };

        // Incoming display fields win, quantity comes from the existing line
        let quantity = existing.quantity.saturating_add(1);
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == new_item.id {
                    new_item.clone().with_quantity(quantity)
                } else {
                    item.clone()
                }
            })
            .collect();

        (Cart { items }, CartChange::Updated { quantity })
    }

    fn incremented(&self, id: &str) -> (Cart, CartChange) {
        let Some(existing) = self.get(id) else {
            return (self.clone(), CartChange::Unchanged);
        };

        let quantity = existing.quantity.saturating_add(1);
        (
            self.with_quantity(id, quantity),
            CartChange::Incremented { quantity },
        )
    }

    fn decremented(&self, id: &str) -> (Cart, CartChange) {
        let Some(existing) = self.get(id) else {
            return (self.clone(), CartChange::Unchanged);
        };

        if existing.quantity <= 1 {
            let items = self
                .items
                .iter()
                .filter(|item| item.id != id)
                .cloned()
                .collect();
            return (Cart { items }, CartChange::Removed);
        }

        let quantity = existing.quantity - 1;
        (
            self.with_quantity(id, quantity),
            CartChange::Decremented { quantity },
        )
    }

    fn with_quantity(&self, id: &str, quantity: u32) -> Cart {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    CartItem {
                        quantity,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Cart { items }
    }

    // =========================================================================
    // Read Helpers
    // =========================================================================

    /// Returns the line for a product id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns the lines in cart order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterates over the lines in cart order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Returns the number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total number of units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    // =========================================================================
    // Wire Format
    // =========================================================================

    /// Encodes the cart as the persisted JSON array.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Decodes a persisted JSON array and checks the cart invariants.
    ///
    /// Malformed text or a cart that breaks an invariant is an error; it is
    /// never coerced into an empty cart.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let items: Vec<CartItem> = serde_json::from_str(json)?;
        Cart::from_items(items)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
