//! # cart-core: Pure Cart Logic
//!
//! This crate is the **heart** of the marketplace cart. It contains the cart
//! data model and every cart transition as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Marketplace Cart Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Host (cart-cli, UI shell)                     │   │
//! │  │        list ──► add_to_cart ──► increment ──► decrement          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          cart-store (CartStore, listeners, persistence)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cart-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │   error   │  │ validation│  │   │
//! │  │   │ CartItem  │  │   Cart    │  │ CoreError │  │  unique   │  │   │
//! │  │   │NewCartItem│  │  CartOp   │  │           │  │  qty >= 1 │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO ASYNC • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types (`CartItem`, `NewCartItem`)
//! - [`cart`] - The `Cart` sequence, `CartOp` and the transition function
//! - [`error`] - Domain error types
//! - [`validation`] - Invariant checks for carts read back from storage
//!
//! ## Example Usage
//!
//! ```rust
//! use cart_core::{Cart, CartOp, NewCartItem};
//!
//! let shirt = NewCartItem::new("a", "Shirt", "", 10.0);
//!
//! let (cart, _) = Cart::new().apply(&CartOp::Add(shirt));
//! let (cart, _) = cart.apply(&CartOp::Increment("a".into()));
//!
//! assert_eq!(cart.get("a").map(|item| item.quantity), Some(2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange, CartOp};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{CartItem, NewCartItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Namespace prefix used when none is configured.
///
/// Carts written by earlier marketplace clients live under this namespace,
/// so keeping it as the default lets them be read back unchanged.
pub const DEFAULT_NAMESPACE: &str = "@GoMarketplace";

/// Suffix of the key the cart is stored under.
pub const CART_KEY_SUFFIX: &str = "cartProducts";

/// Builds the namespaced storage key for the cart.
///
/// ```rust
/// assert_eq!(
///     cart_core::storage_key(cart_core::DEFAULT_NAMESPACE),
///     "@GoMarketplace:cartProducts"
/// );
/// ```
pub fn storage_key(namespace: &str) -> String {
    format!("{}:{}", namespace, CART_KEY_SUFFIX)
}
