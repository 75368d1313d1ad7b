//! Row types for the remote store.
//!
//! Field names and nesting match the store's JSON wire format, so these
//! types serialize/deserialize directly against it. Prices are
//! [`rust_decimal::Decimal`]; a missing product join is represented as
//! `None` and treated as price zero wherever totals are derived.

use chrono::{DateTime, Utc};
use luxe_core::{CartItemId, OrderId, OrderStatus, ProductId, ShippingAddress, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product. Read-only reference data from the client's
/// perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub featured: bool,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filter for product listings. `None` fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Filter on the featured flag.
    pub featured: Option<bool>,
    /// Maximum number of rows returned.
    pub limit: Option<u32>,
}

impl ProductFilter {
    /// The home-page rail: featured products, capped at four.
    #[must_use]
    pub fn featured_rail() -> Self {
        Self {
            category: None,
            featured: Some(true),
            limit: Some(4),
        }
    }
}

/// One cart row, with the product join denormalized alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Embedded product snapshot from the read join. `None` when the join
    /// did not materialize; totals treat that as price zero.
    #[serde(default)]
    pub product: Option<Product>,
}

impl CartItem {
    /// Price of this line: embedded product price (or zero) times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        let price = self.product.as_ref().map_or(Decimal::ZERO, |p| p.price);
        price * Decimal::from(self.quantity)
    }
}

/// Insert payload for a cart row. The store assigns the row id.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A persisted order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Short display reference: the first 8 hex characters of the id,
    /// uppercase.
    #[must_use]
    pub fn reference(&self) -> String {
        self.id
            .as_uuid()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Insert payload for an order header. The store assigns id and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
}

/// One order line item. The unit price is a snapshot captured at placement
/// time, deliberately decoupled from the live product price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_product(price: Decimal) -> Product {
        Product {
            id: ProductId::new(),
            name: "Leather Tote".to_string(),
            price,
            stock: 12,
            category: "Bags".to_string(),
            featured: false,
            image_url: None,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total_multiplies_price_by_quantity() {
        let item = CartItem {
            id: CartItemId::new(),
            user_id: UserId::new(),
            product_id: ProductId::new(),
            quantity: 3,
            product: Some(sample_product(Decimal::new(2999, 2))),
        };
        assert_eq!(item.line_total(), Decimal::new(8997, 2));
    }

    #[test]
    fn test_line_total_missing_product_is_zero() {
        let item = CartItem {
            id: CartItemId::new(),
            user_id: UserId::new(),
            product_id: ProductId::new(),
            quantity: 5,
            product: None,
        };
        assert_eq!(item.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_cart_row_deserializes_from_wire_shape() {
        // Shape produced by the store for a joined cart read; extra row
        // columns are ignored, a missing join becomes None.
        let json = r#"{
            "id": "7f9c24e5-2f86-4d50-9d3c-1f6b0a8a4a01",
            "user_id": "0a9f66a0-9c3d-4d4e-8f8a-3a1c2b4d5e6f",
            "product_id": "d4c3b2a1-0f9e-8d7c-6b5a-4f3e2d1c0b9a",
            "quantity": 2,
            "created_at": "2026-08-01T10:15:30+00:00",
            "product": {
                "id": "d4c3b2a1-0f9e-8d7c-6b5a-4f3e2d1c0b9a",
                "name": "Silk Scarf",
                "price": 45.00,
                "stock": 8,
                "category": "Accessories",
                "featured": true,
                "image_url": null,
                "description": "Hand-rolled edges",
                "created_at": "2026-07-20T08:00:00+00:00"
            }
        }"#;

        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, 2);
        let product = item.product.as_ref().unwrap();
        assert_eq!(product.name, "Silk Scarf");
        assert_eq!(product.price, Decimal::new(4500, 2));
        assert_eq!(item.line_total(), Decimal::new(9000, 2));

        let bare = r#"{
            "id": "7f9c24e5-2f86-4d50-9d3c-1f6b0a8a4a01",
            "user_id": "0a9f66a0-9c3d-4d4e-8f8a-3a1c2b4d5e6f",
            "product_id": "d4c3b2a1-0f9e-8d7c-6b5a-4f3e2d1c0b9a",
            "quantity": 2
        }"#;
        let item: CartItem = serde_json::from_str(bare).unwrap();
        assert!(item.product.is_none());
    }

    #[test]
    fn test_new_order_serializes_wire_keys() {
        use luxe_core::ShippingInput;

        let address = ShippingAddress::parse(ShippingInput {
            full_name: "Jane Doe".into(),
            address: "123 Main Street".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "62704".into(),
            country: "USA".into(),
        })
        .unwrap();

        let order = NewOrder {
            user_id: UserId::new(),
            total: Decimal::new(12000, 2),
            shipping_address: address,
            status: OrderStatus::Confirmed,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["shipping_address"]["fullName"], "Jane Doe");
        assert_eq!(json["shipping_address"]["zipCode"], "62704");
    }

    #[test]
    fn test_order_reference_is_first_eight_hex_uppercase() {
        let uuid = Uuid::parse_str("a1b2c3d4-e5f6-4a0b-8c9d-0e1f2a3b4c5d").unwrap();
        let order = Order {
            id: OrderId::from_uuid(uuid),
            user_id: UserId::new(),
            total: Decimal::new(100, 0),
            shipping_address: serde_json::from_str(
                r#"{"fullName":"Jane Doe","address":"123 Main Street","city":"Springfield","state":"IL","zipCode":"62704","country":"USA"}"#,
            )
            .unwrap(),
            status: OrderStatus::Confirmed,
            created_at: Utc::now(),
        };
        assert_eq!(order.reference(), "A1B2C3D4");
    }

    #[test]
    fn test_featured_rail_filter() {
        let filter = ProductFilter::featured_rail();
        assert_eq!(filter.featured, Some(true));
        assert_eq!(filter.limit, Some(4));
        assert!(filter.category.is_none());
    }
}
