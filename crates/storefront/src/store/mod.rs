//! Remote row-store access.
//!
//! # Architecture
//!
//! - The store exposes plain row CRUD with per-row atomicity; there are no
//!   multi-statement transactions visible to the client
//! - The store is source of truth for cart rows - every cart mutation
//!   round-trips through it before local state changes
//! - [`RemoteStore`] is the seam: [`RestStore`] talks to the hosted store
//!   over REST, [`MemoryStore`] backs tests and local development
//!
//! # Example
//!
//! ```rust,ignore
//! use luxe_storefront::store::{RemoteStore, RestStore};
//!
//! let store = RestStore::new(&config)?;
//!
//! // Read a user's cart with the product join
//! let items = store.cart_items(user_id).await?;
//!
//! // Add a row
//! store.insert_cart_item(&NewCartItem {
//!     user_id,
//!     product_id,
//!     quantity: 1,
//! })
//! .await?;
//! ```

pub mod memory;
pub mod rest;
pub mod types;

pub use memory::{MemoryStore, StoreGate, StoreOp};
pub use rest::RestStore;
pub use types::{
    CartItem, NewCartItem, NewOrder, Order, OrderItem, Product, ProductFilter,
};

use luxe_core::{CartItemId, ProductId, UserId};
use thiserror::Error;

/// Errors that can occur when interacting with the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured store key cannot be used in a request header.
    #[error("Invalid store key: {0}")]
    InvalidKey(String),
}

impl StoreError {
    /// Whether this error is the (user, product) uniqueness rejection.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Row-level access to the remote store.
///
/// Every method returns either a result payload or a [`StoreError`]; nothing
/// panics as a signaling mechanism. Implementations are cheap to clone and
/// share their underlying connection state.
pub trait RemoteStore: Clone + Send + Sync {
    /// List products matching `filter`, newest first.
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Fetch a single product by id.
    async fn product(&self, id: ProductId) -> Result<Product, StoreError>;

    /// List the user's cart rows with their embedded product join.
    async fn cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, StoreError>;

    /// Insert a new cart row.
    ///
    /// The store enforces one row per (user, product); a duplicate insert
    /// fails with [`StoreError::Conflict`].
    async fn insert_cart_item(&self, item: &NewCartItem) -> Result<(), StoreError>;

    /// Set the quantity of a cart row. Updating a row that no longer exists
    /// succeeds as a no-op, matching row-filter update semantics.
    async fn update_cart_item_quantity(
        &self,
        id: CartItemId,
        quantity: i32,
    ) -> Result<(), StoreError>;

    /// Delete a single cart row. Deleting an absent row is a no-op.
    async fn delete_cart_item(&self, id: CartItemId) -> Result<(), StoreError>;

    /// Delete all of the user's cart rows.
    async fn delete_cart(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Insert an order header, returning the stored row with its assigned id.
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Insert order line items in one batch.
    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<(), StoreError>;

    /// List the user's orders, newest first.
    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");
    }

    #[test]
    fn test_api_error_display() {
        let err = StoreError::Api {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - internal error");
    }

    #[test]
    fn test_conflict_detection() {
        let conflict = StoreError::Conflict("duplicate cart item".to_string());
        assert!(conflict.is_conflict());
        assert_eq!(conflict.to_string(), "Conflict: duplicate cart item");

        let other = StoreError::Api {
            status: 500,
            message: String::new(),
        };
        assert!(!other.is_conflict());
    }
}
