//! CLI command implementations.

use chrono::Utc;
use luxe_core::ProductId;
use luxe_storefront::store::types::Product;
use luxe_storefront::store::MemoryStore;
use rust_decimal::Decimal;

pub mod demo;
pub mod products;

/// A small catalog so the commands have something to sell.
pub(crate) fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (name, cents, category, featured) in [
        ("Silk Evening Scarf", 8950, "accessories", true),
        ("Leather Weekender", 44500, "bags", true),
        ("Cashmere Crewneck", 32000, "knitwear", true),
        ("Gold-Plated Cuff", 15000, "jewelry", true),
        ("Merino Beanie", 6500, "accessories", false),
        ("Wool Overcoat", 78000, "outerwear", false),
        ("Suede Loafers", 29000, "shoes", false),
        ("Linen Shirt", 12000, "shirts", false),
    ] {
        store.insert_product(Product {
            id: ProductId::new(),
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            stock: 12,
            category: category.to_string(),
            featured,
            image_url: None,
            description: None,
            created_at: Utc::now(),
        });
    }
    store
}
