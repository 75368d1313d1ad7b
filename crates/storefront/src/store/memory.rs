//! In-memory store backend for tests and local development.
//!
//! Behaves like the hosted row store: per-row atomicity, (user, product)
//! uniqueness on cart rows, product join on cart reads, newest-first
//! ordering. Two controls make failure and race handling testable:
//!
//! - [`MemoryStore::fail_next`] makes the next call for an operation fail
//!   with an injected error before touching any table
//! - [`MemoryStore::hold_next`] parks the next response for an operation
//!   after the write/read has been applied, until the returned
//!   [`StoreGate`] is released - the in-memory analogue of a slow response

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use luxe_core::{CartItemId, OrderId, ProductId, UserId};
use tokio::sync::Notify;

use super::types::{CartItem, NewCartItem, NewOrder, Order, OrderItem, Product, ProductFilter};
use super::{RemoteStore, StoreError};

/// Store operations addressable by [`MemoryStore::fail_next`] and
/// [`MemoryStore::hold_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Products,
    Product,
    CartItems,
    InsertCartItem,
    UpdateCartItemQuantity,
    DeleteCartItem,
    DeleteCart,
    InsertOrder,
    InsertOrderItems,
    Orders,
}

/// Handle for a held response. The corresponding store call stays parked
/// until [`StoreGate::release`] is called; releasing before the call
/// arrives lets it pass straight through.
pub struct StoreGate {
    notify: Arc<Notify>,
}

impl StoreGate {
    /// Let the held response through.
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone)]
struct CartRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
}

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    cart_items: Vec<CartRow>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

#[derive(Default)]
struct Controls {
    failures: HashMap<StoreOp, u32>,
    gates: HashMap<StoreOp, VecDeque<Arc<Notify>>>,
}

#[derive(Default)]
struct Inner {
    tables: Mutex<Tables>,
    controls: Mutex<Controls>,
}

/// In-memory [`RemoteStore`] implementation.
///
/// Clones share the same tables, mirroring how REST store clones share a
/// connection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog product. Re-seeding an existing id replaces the row.
    pub fn insert_product(&self, product: Product) {
        let mut tables = self.tables();
        if let Some(existing) = tables.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product;
        } else {
            tables.products.push(product);
        }
    }

    /// Make the next `op` call fail with an injected API error. Stacks:
    /// calling this twice fails the next two calls.
    pub fn fail_next(&self, op: StoreOp) {
        *self.controls().failures.entry(op).or_insert(0) += 1;
    }

    /// Hold the next `op` response until the returned gate is released.
    /// Repeated calls queue additional gates in arrival order.
    #[must_use]
    pub fn hold_next(&self, op: StoreOp) -> StoreGate {
        let notify = Arc::new(Notify::new());
        self.controls()
            .gates
            .entry(op)
            .or_default()
            .push_back(Arc::clone(&notify));
        StoreGate { notify }
    }

    /// Line items stored for an order, in insertion order. Test inspection
    /// helper; the client contract never reads these back.
    #[must_use]
    pub fn order_items(&self, order_id: OrderId) -> Vec<OrderItem> {
        self.tables()
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.inner
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn controls(&self) -> MutexGuard<'_, Controls> {
        self.inner
            .controls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut controls = self.controls();
        if let Some(count) = controls.failures.get_mut(&op)
            && *count > 0
        {
            *count -= 1;
            return Err(StoreError::Api {
                status: 503,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    async fn pass_gate(&self, op: StoreOp) {
        let gate = self
            .controls()
            .gates
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        if let Some(notify) = gate {
            notify.notified().await;
        }
    }

    fn join_product(tables: &Tables, row: &CartRow) -> CartItem {
        CartItem {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            product: tables
                .products
                .iter()
                .find(|p| p.id == row.product_id)
                .cloned(),
        }
    }
}

impl RemoteStore for MemoryStore {
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        self.take_failure(StoreOp::Products)?;
        let result = {
            let tables = self.tables();
            // Reverse before the stable sort so equal timestamps still come
            // out newest-insert first
            let mut rows: Vec<Product> = tables
                .products
                .iter()
                .rev()
                .filter(|p| {
                    filter.category.as_ref().is_none_or(|c| &p.category == c)
                        && filter.featured.is_none_or(|f| p.featured == f)
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if let Some(limit) = filter.limit {
                rows.truncate(limit as usize);
            }
            rows
        };
        self.pass_gate(StoreOp::Products).await;
        Ok(result)
    }

    async fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.take_failure(StoreOp::Product)?;
        let result = self.tables().products.iter().find(|p| p.id == id).cloned();
        self.pass_gate(StoreOp::Product).await;
        result.ok_or_else(|| StoreError::NotFound(format!("Product not found: {id}")))
    }

    async fn cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        self.take_failure(StoreOp::CartItems)?;
        let result = {
            let tables = self.tables();
            tables
                .cart_items
                .iter()
                .filter(|row| row.user_id == user_id)
                .map(|row| Self::join_product(&tables, row))
                .collect()
        };
        self.pass_gate(StoreOp::CartItems).await;
        Ok(result)
    }

    async fn insert_cart_item(&self, item: &NewCartItem) -> Result<(), StoreError> {
        self.take_failure(StoreOp::InsertCartItem)?;
        let result = {
            let mut tables = self.tables();
            let duplicate = tables
                .cart_items
                .iter()
                .any(|row| row.user_id == item.user_id && row.product_id == item.product_id);
            if duplicate {
                Err(StoreError::Conflict(format!(
                    "cart item for product {} already exists",
                    item.product_id
                )))
            } else {
                tables.cart_items.push(CartRow {
                    id: CartItemId::new(),
                    user_id: item.user_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
                Ok(())
            }
        };
        self.pass_gate(StoreOp::InsertCartItem).await;
        result
    }

    async fn update_cart_item_quantity(
        &self,
        id: CartItemId,
        quantity: i32,
    ) -> Result<(), StoreError> {
        self.take_failure(StoreOp::UpdateCartItemQuantity)?;
        {
            let mut tables = self.tables();
            // Matching zero rows is a successful no-op, like a filtered
            // update against the hosted store
            if let Some(row) = tables.cart_items.iter_mut().find(|row| row.id == id) {
                row.quantity = quantity;
            }
        }
        self.pass_gate(StoreOp::UpdateCartItemQuantity).await;
        Ok(())
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<(), StoreError> {
        self.take_failure(StoreOp::DeleteCartItem)?;
        self.tables().cart_items.retain(|row| row.id != id);
        self.pass_gate(StoreOp::DeleteCartItem).await;
        Ok(())
    }

    async fn delete_cart(&self, user_id: UserId) -> Result<(), StoreError> {
        self.take_failure(StoreOp::DeleteCart)?;
        self.tables().cart_items.retain(|row| row.user_id != user_id);
        self.pass_gate(StoreOp::DeleteCart).await;
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.take_failure(StoreOp::InsertOrder)?;
        let stored = Order {
            id: OrderId::new(),
            user_id: order.user_id,
            total: order.total,
            shipping_address: order.shipping_address.clone(),
            status: order.status,
            created_at: Utc::now(),
        };
        self.tables().orders.push(stored.clone());
        self.pass_gate(StoreOp::InsertOrder).await;
        Ok(stored)
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<(), StoreError> {
        self.take_failure(StoreOp::InsertOrderItems)?;
        self.tables().order_items.extend_from_slice(items);
        self.pass_gate(StoreOp::InsertOrderItems).await;
        Ok(())
    }

    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.take_failure(StoreOp::Orders)?;
        let result = {
            let tables = self.tables();
            let mut rows: Vec<Order> = tables
                .orders
                .iter()
                .rev()
                .filter(|order| order.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows
        };
        self.pass_gate(StoreOp::Orders).await;
        Ok(result)
    }
}
