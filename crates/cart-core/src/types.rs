//! # Line Item Types
//!
//! The two shapes a cart line takes.
//!
//! ```text
//! ┌───────────────────────┐           ┌───────────────────────┐
//! │     NewCartItem       │  add ───► │       CartItem        │
//! │  ───────────────────  │           │  ───────────────────  │
//! │  id                   │           │  id                   │
//! │  title                │           │  title                │
//! │  image_url            │           │  image_url            │
//! │  price                │           │  price                │
//! │                       │           │  quantity (>= 1)      │
//! └───────────────────────┘           └───────────────────────┘
//! ```
//!
//! ## Wire Names
//! Field names are the persisted JSON keys (`image_url`, not `imageUrl`).
//! Whatever is written on save is what is read on load, so these must not be
//! renamed without migrating stored carts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// New Cart Item
// =============================================================================

/// A product descriptor as handed to `add_to_cart`.
///
/// It carries everything a [`CartItem`] has except the quantity, which the
/// cart computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCartItem {
    /// Product identifier, the key for every cart lookup.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Display image reference.
    pub image_url: String,

    /// Unit price. Currency-agnostic, never rounded here.
    pub price: f64,
}

impl NewCartItem {
    /// Creates a product descriptor.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewCartItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turns the descriptor into a cart line with the given quantity.
    pub fn with_quantity(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One product line in the cart.
///
/// ## Invariants
/// - `quantity >= 1` while the line is in a cart; a line that would drop to
///   zero is removed instead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product identifier (unique within a cart).
    pub id: String,

    /// Display name.
    pub title: String,

    /// Display image reference.
    pub image_url: String,

    /// Unit price.
    pub price: f64,

    /// Number of units of this product in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Returns the product descriptor part of this line.
    pub fn descriptor(&self) -> NewCartItem {
        NewCartItem {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }
}
