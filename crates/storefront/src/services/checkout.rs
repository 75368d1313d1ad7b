//! Checkout flow.
//!
//! A [`CheckoutFlow`] walks one cart through shipping capture, review, and
//! order placement. It borrows the cart service for its whole lifetime, so a
//! flow can never outlive the session that opened it.
//!
//! Order placement is three store writes with no transaction around them:
//! the order row, its line items, then the cart clear. The failure modes of
//! that sequence are spelled out on [`CheckoutFlow::place_order`].

use luxe_core::{AddressError, OrderStatus, ShippingAddress, ShippingInput};
use rust_decimal::Decimal;
use tracing::{error, instrument, warn};

use crate::services::cart::CartService;
use crate::store::types::{NewOrder, Order, OrderItem};
use crate::store::{RemoteStore, StoreError};

/// Subtotal at which shipping becomes free, in whole dollars.
const FREE_SHIPPING_THRESHOLD: i64 = 150;

/// Flat shipping fee below the threshold, in whole dollars.
const FLAT_SHIPPING_FEE: i64 = 15;

/// Where the flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Capturing the shipping address.
    Shipping,
    /// Address captured; showing the order summary.
    Review,
    /// Order placed; the flow is finished.
    Placed,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Shipping details are incomplete")]
    ShippingIncomplete,
    #[error("Order already placed")]
    AlreadyPlaced,
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Money breakdown for the review panel.
///
/// Display-only. The persisted order total is the subtotal; shipping is
/// recomputed wherever it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Orders at or above the free-shipping threshold ship free; everything
    /// below pays the flat fee.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal >= Decimal::from(FREE_SHIPPING_THRESHOLD) {
            Decimal::ZERO
        } else {
            Decimal::from(FLAT_SHIPPING_FEE)
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

/// One checkout attempt over a live cart.
pub struct CheckoutFlow<'a, S> {
    cart: &'a CartService<S>,
    state: CheckoutState,
    address: Option<ShippingAddress>,
}

impl<'a, S: RemoteStore> CheckoutFlow<'a, S> {
    /// Open a flow at the shipping step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart has no items;
    /// there is nothing to check out.
    pub fn begin(cart: &'a CartService<S>) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            cart,
            state: CheckoutState::Shipping,
            address: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// The captured address, once shipping has been submitted.
    #[must_use]
    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    /// Totals for the review panel, from the cart as it stands right now.
    #[must_use]
    pub fn totals(&self) -> CheckoutTotals {
        CheckoutTotals::from_subtotal(self.cart.total_price())
    }

    /// Validate the shipping form and advance to review.
    ///
    /// All fields are checked in one pass; the error lists every failing
    /// field, not just the first.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidAddress`] when any field fails validation,
    /// [`CheckoutError::AlreadyPlaced`] once the order has been placed.
    pub fn submit_shipping(&mut self, input: ShippingInput) -> Result<(), CheckoutError> {
        if self.state == CheckoutState::Placed {
            return Err(CheckoutError::AlreadyPlaced);
        }
        self.address = Some(ShippingAddress::parse(input)?);
        self.state = CheckoutState::Review;
        Ok(())
    }

    /// Return from review to the shipping step. The captured address is
    /// kept so the form comes back filled in.
    pub fn back(&mut self) {
        if self.state == CheckoutState::Review {
            self.state = CheckoutState::Shipping;
        }
    }

    /// Place the order from the cart's current contents.
    ///
    /// The cart is snapshotted once, and the order total is that snapshot's
    /// subtotal. Writes run in order: order row, line items, cart clear.
    ///
    /// A line-item failure leaves the already-created order behind without
    /// lines; the order id is logged and the flow stays in review, so a
    /// retry creates a second order rather than silently reusing the broken
    /// one. A cart-clear failure after both inserts is logged and swallowed,
    /// since the order itself went through.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::ShippingIncomplete`] before shipping is submitted,
    /// [`CheckoutError::AlreadyPlaced`] after a successful placement,
    /// [`CheckoutError::EmptyCart`] when the cart emptied since review, and
    /// [`CheckoutError::Store`] for failed writes.
    #[instrument(skip(self), fields(user_id = %self.cart.user_id()))]
    pub async fn place_order(&mut self) -> Result<Order, CheckoutError> {
        if self.state == CheckoutState::Placed {
            return Err(CheckoutError::AlreadyPlaced);
        }
        let Some(address) = self.address.clone() else {
            return Err(CheckoutError::ShippingIncomplete);
        };

        let (items, subtotal) = self.cart.snapshot();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let store = self.cart.store();
        let new_order = NewOrder {
            user_id: self.cart.user_id(),
            total: subtotal,
            shipping_address: address,
            status: OrderStatus::Confirmed,
        };
        let order = match store.insert_order(&new_order).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "Failed to place order");
                return Err(e.into());
            }
        };

        let order_items: Vec<OrderItem> = items
            .iter()
            .map(|item| OrderItem {
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.product.as_ref().map_or(Decimal::ZERO, |p| p.price),
            })
            .collect();
        if let Err(e) = store.insert_order_items(&order_items).await {
            error!(
                error = %e,
                order_id = %order.id,
                "Order created but line items failed to persist"
            );
            return Err(e.into());
        }

        if let Err(e) = self.cart.clear().await {
            warn!(
                error = %e,
                order_id = %order.id,
                "Order placed but cart clear failed"
            );
        }

        self.state = CheckoutState::Placed;
        Ok(order)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use luxe_core::{AddressField, ProductId, UserId};

    use super::*;
    use crate::services::cart::CartContext;
    use crate::store::memory::{MemoryStore, StoreOp};
    use crate::store::types::Product;
    use crate::store::RemoteStore;

    fn seed_product(store: &MemoryStore, price: Decimal) -> ProductId {
        let product = Product {
            id: ProductId::new(),
            name: "Leather Tote".to_string(),
            price,
            stock: 10,
            category: "bags".to_string(),
            featured: false,
            image_url: None,
            description: None,
            created_at: Utc::now(),
        };
        let id = product.id;
        store.insert_product(product);
        id
    }

    fn valid_input() -> ShippingInput {
        ShippingInput {
            full_name: "Avery Quinn".to_string(),
            address: "500 Mercer Street".to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            zip_code: "98109".to_string(),
            country: "US".to_string(),
        }
    }

    async fn cart_with_items(
        store: &MemoryStore,
        prices: &[(Decimal, i32)],
    ) -> CartService<MemoryStore> {
        let cart = CartService::new(CartContext {
            user_id: UserId::new(),
            store: store.clone(),
        });
        for &(price, quantity) in prices {
            let product_id = seed_product(store, price);
            cart.add(product_id, quantity).await.unwrap();
        }
        cart
    }

    #[test]
    fn test_totals_below_threshold_pay_flat_shipping() {
        let totals = CheckoutTotals::from_subtotal(Decimal::from(120));
        assert_eq!(totals.shipping, Decimal::from(15));
        assert_eq!(totals.total, Decimal::from(135));
    }

    #[test]
    fn test_totals_at_threshold_ship_free() {
        let totals = CheckoutTotals::from_subtotal(Decimal::from(150));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(150));
    }

    #[test]
    fn test_totals_just_under_threshold_pay_flat_shipping() {
        let totals = CheckoutTotals::from_subtotal(Decimal::new(14999, 2));
        assert_eq!(totals.shipping, Decimal::from(15));
        assert_eq!(totals.total, Decimal::new(16499, 2));
    }

    #[tokio::test]
    async fn test_begin_refuses_an_empty_cart() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[]).await;

        let result = CheckoutFlow::begin(&cart);

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_submit_shipping_reports_every_failing_field() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let mut flow = CheckoutFlow::begin(&cart).unwrap();

        let mut input = valid_input();
        input.full_name = "A".to_string();
        input.zip_code = "12".to_string();
        let err = flow.submit_shipping(input).unwrap_err();

        match err {
            CheckoutError::InvalidAddress(e) => {
                assert_eq!(e.fields(), &[AddressField::FullName, AddressField::ZipCode]);
            }
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
        assert_eq!(flow.state(), CheckoutState::Shipping);
        assert!(flow.shipping_address().is_none());
    }

    #[tokio::test]
    async fn test_submit_shipping_advances_to_review() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let mut flow = CheckoutFlow::begin(&cart).unwrap();

        flow.submit_shipping(valid_input()).unwrap();

        assert_eq!(flow.state(), CheckoutState::Review);
        assert!(flow.shipping_address().is_some());
    }

    #[tokio::test]
    async fn test_back_returns_to_shipping_and_keeps_the_address() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let mut flow = CheckoutFlow::begin(&cart).unwrap();
        flow.submit_shipping(valid_input()).unwrap();

        flow.back();

        assert_eq!(flow.state(), CheckoutState::Shipping);
        assert!(flow.shipping_address().is_some());
    }

    #[tokio::test]
    async fn test_place_order_requires_a_submitted_address() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let mut flow = CheckoutFlow::begin(&cart).unwrap();

        let result = flow.place_order().await;

        assert!(matches!(result, Err(CheckoutError::ShippingIncomplete)));
    }

    #[tokio::test]
    async fn test_place_order_persists_order_items_and_clears_cart() {
        let store = MemoryStore::new();
        let cart = cart_with_items(
            &store,
            &[(Decimal::new(4500, 2), 2), (Decimal::new(3000, 2), 1)],
        )
        .await;
        let user_id = cart.user_id();
        let mut flow = CheckoutFlow::begin(&cart).unwrap();
        flow.submit_shipping(valid_input()).unwrap();

        let order = flow.place_order().await.unwrap();

        // Persisted total is the lines subtotal, not the shipped total
        assert_eq!(order.total, Decimal::new(12000, 2));
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.user_id, user_id);

        let lines = store.order_items(order.id);
        assert_eq!(lines.len(), 2);
        let line_sum: Decimal = lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        assert_eq!(line_sum, order.total);

        assert!(cart.is_empty());
        cart.fetch().await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(flow.state(), CheckoutState::Placed);
    }

    #[tokio::test]
    async fn test_place_order_twice_is_rejected() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let mut flow = CheckoutFlow::begin(&cart).unwrap();
        flow.submit_shipping(valid_input()).unwrap();
        flow.place_order().await.unwrap();

        let result = flow.place_order().await;

        assert!(matches!(result, Err(CheckoutError::AlreadyPlaced)));
    }

    #[tokio::test]
    async fn test_line_item_failure_leaves_order_without_lines() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 2)]).await;
        let user_id = cart.user_id();
        let mut flow = CheckoutFlow::begin(&cart).unwrap();
        flow.submit_shipping(valid_input()).unwrap();
        store.fail_next(StoreOp::InsertOrderItems);

        let result = flow.place_order().await;

        assert!(matches!(result, Err(CheckoutError::Store(_))));
        // The order row went through before the failure
        let orders = store.orders(user_id).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert!(store.order_items(orders[0].id).is_empty());
        // Cart untouched, flow still open for a retry
        assert!(!cart.is_empty());
        assert_eq!(flow.state(), CheckoutState::Review);
    }

    #[tokio::test]
    async fn test_cart_clear_failure_does_not_fail_the_order() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let user_id = cart.user_id();
        let mut flow = CheckoutFlow::begin(&cart).unwrap();
        flow.submit_shipping(valid_input()).unwrap();
        store.fail_next(StoreOp::DeleteCart);

        let order = flow.place_order().await.unwrap();

        assert_eq!(flow.state(), CheckoutState::Placed);
        assert_eq!(store.orders(user_id).await.unwrap().len(), 1);
        assert_eq!(store.order_items(order.id).len(), 1);
        // The clear failed, so the cart rows are still there
        assert!(!cart.is_empty());
    }

    #[tokio::test]
    async fn test_order_failure_leaves_cart_intact() {
        let store = MemoryStore::new();
        let cart = cart_with_items(&store, &[(Decimal::TEN, 1)]).await;
        let user_id = cart.user_id();
        let mut flow = CheckoutFlow::begin(&cart).unwrap();
        flow.submit_shipping(valid_input()).unwrap();
        store.fail_next(StoreOp::InsertOrder);

        let result = flow.place_order().await;

        assert!(matches!(result, Err(CheckoutError::Store(_))));
        assert!(store.orders(user_id).await.unwrap().is_empty());
        assert!(!cart.is_empty());
    }
}
