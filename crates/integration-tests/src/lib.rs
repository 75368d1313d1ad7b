//! Integration tests for the LUXE storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p luxe-integration-tests
//! ```
//!
//! Everything runs against the in-memory store; no server or credentials
//! are required. Race properties are driven deterministically with the
//! store's response gates and manual polling, never with sleeps.
//!
//! Shared fixtures live here so the test files stay focused on behavior.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::Utc;
use luxe_core::{ProductId, ShippingInput};
use luxe_storefront::store::types::Product;
use luxe_storefront::store::MemoryStore;
use rust_decimal::Decimal;

/// Insert a product and return its id.
#[must_use]
pub fn seed_product(store: &MemoryStore, name: &str, price: Decimal) -> ProductId {
    seed_product_in(store, name, price, "accessories", false)
}

/// Insert a product with full control over category and featured flag.
#[must_use]
pub fn seed_product_in(
    store: &MemoryStore,
    name: &str,
    price: Decimal,
    category: &str,
    featured: bool,
) -> ProductId {
    let product = Product {
        id: ProductId::new(),
        name: name.to_string(),
        price,
        stock: 25,
        category: category.to_string(),
        featured,
        image_url: None,
        description: None,
        created_at: Utc::now(),
    };
    let id = product.id;
    store.insert_product(product);
    id
}

/// A shipping form that passes validation.
#[must_use]
pub fn valid_shipping() -> ShippingInput {
    ShippingInput {
        full_name: "Avery Quinn".to_string(),
        address: "500 Mercer Street".to_string(),
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        zip_code: "98109".to_string(),
        country: "US".to_string(),
    }
}
