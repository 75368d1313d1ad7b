//! Cart service.
//!
//! [`CartService`] holds the only local copy of a signed-in user's cart and
//! keeps it consistent with the store across concurrent mutations. The store
//! is the source of truth for persistence; the service is the source of truth
//! for what the user currently sees.
//!
//! # Consistency model
//!
//! Every mutation takes a ticket from a monotonic counter before it goes on
//! the wire, and per-item mutations record their ticket as the newest one for
//! that item. When a response comes back, it is applied only if its ticket is
//! still the newest; anything overtaken while in flight is discarded. Reads
//! work the same way against the global counter, re-issuing instead of
//! clobbering newer local state. Removals and cart clears apply regardless,
//! since a delete is definitive no matter what raced it.
//!
//! The state lock is a plain [`std::sync::Mutex`] and is never held across an
//! await point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use luxe_core::{CartItemId, ProductId, UserId};
use rust_decimal::Decimal;
use tracing::{debug, error, instrument};

use crate::store::types::{CartItem, NewCartItem};
use crate::store::{RemoteStore, StoreError};

/// Everything a cart operation needs: the signed-in user and a store handle.
///
/// Built at sign-in and dropped at sign-out. There is no ambient current-user
/// lookup; an operation without a context cannot exist.
#[derive(Clone)]
pub struct CartContext<S> {
    pub user_id: UserId,
    pub store: S,
}

#[derive(Default)]
struct CartState {
    items: Vec<CartItem>,
    loading: bool,
    /// Monotonic ticket counter; every mutation takes the next value.
    issued: u64,
    /// Newest ticket per item. A response carrying an older ticket is stale.
    item_issues: HashMap<CartItemId, u64>,
}

impl CartState {
    /// Take the next mutation ticket.
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Take the next ticket and record it as the newest for `item`.
    fn issue_for(&mut self, item: CartItemId) -> u64 {
        let seq = self.issue();
        self.item_issues.insert(item, seq);
        seq
    }

    fn is_current(&self, item: CartItemId, seq: u64) -> bool {
        self.item_issues.get(&item).copied() == Some(seq)
    }
}

/// The authoritative local view of one user's cart.
///
/// All methods take `&self`; internal state lives behind a mutex so the
/// service can be shared across tasks without cloning the item list on every
/// mutation.
pub struct CartService<S> {
    ctx: CartContext<S>,
    state: Mutex<CartState>,
}

impl<S: RemoteStore> CartService<S> {
    #[must_use]
    pub fn new(ctx: CartContext<S>) -> Self {
        Self {
            ctx,
            state: Mutex::new(CartState::default()),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.ctx.user_id
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.ctx.store
    }

    fn state(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current items, with product snapshots where the store joined them.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state().items.clone()
    }

    /// Whether a [`fetch`](Self::fetch) is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.state()
            .items
            .iter()
            .map(|item| i64::from(item.quantity))
            .sum()
    }

    /// Subtotal across all lines. Lines whose product snapshot is missing
    /// contribute zero.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state().items.iter().map(CartItem::line_total).sum()
    }

    /// Items and subtotal captured under the same lock, so checkout prices
    /// exactly what it lists.
    pub(crate) fn snapshot(&self) -> (Vec<CartItem>, Decimal) {
        let state = self.state();
        let subtotal = state.items.iter().map(CartItem::line_total).sum();
        (state.items.clone(), subtotal)
    }

    fn find_product(&self, product_id: ProductId) -> Option<(CartItemId, i32)> {
        self.state()
            .items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| (item.id, item.quantity))
    }

    /// Replace local state with the store's view of the cart.
    ///
    /// The read is ticketed against the mutation counter: if a mutation lands
    /// while the read is in flight, the response is stale and the read
    /// re-issues instead of clobbering newer local state.
    ///
    /// # Errors
    ///
    /// Returns the store error on a failed read. Prior local items are kept
    /// so the caller can continue showing them.
    #[instrument(skip(self), fields(user_id = %self.ctx.user_id))]
    pub async fn fetch(&self) -> Result<(), StoreError> {
        self.state().loading = true;

        let result = loop {
            let issued_at = self.state().issued;
            match self.ctx.store.cart_items(self.ctx.user_id).await {
                Ok(items) => {
                    let mut state = self.state();
                    if state.issued == issued_at {
                        state.items = items;
                        break Ok(());
                    }
                    debug!("discarding stale cart read, re-issuing");
                }
                Err(e) => break Err(e),
            }
        };

        self.state().loading = false;

        if let Err(e) = &result {
            error!(error = %e, "Failed to fetch cart, keeping previous items");
        }
        result
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// If the product already has a line, the quantities are summed through
    /// [`update_quantity`](Self::update_quantity). Otherwise a row is
    /// inserted and the cart re-fetched to pick up the assigned id and
    /// product snapshot. When another device inserted the same product
    /// first, the store rejects the insert as a conflict and recovery is a
    /// re-fetch followed by the same quantity sum.
    ///
    /// # Errors
    ///
    /// Returns the store error when the insert (or the merge it falls back
    /// to) fails. A failed refresh after a successful insert is not an
    /// error; the view is merely stale until the next fetch.
    #[instrument(skip(self), fields(user_id = %self.ctx.user_id, product_id = %product_id, quantity))]
    pub async fn add(&self, product_id: ProductId, quantity: i32) -> Result<(), StoreError> {
        if let Some((item_id, existing)) = self.find_product(product_id) {
            return self.update_quantity(item_id, existing + quantity).await;
        }

        // No line to create for a non-positive quantity
        if quantity <= 0 {
            return Ok(());
        }

        self.state().issue();
        let new_item = NewCartItem {
            user_id: self.ctx.user_id,
            product_id,
            quantity,
        };
        match self.ctx.store.insert_cart_item(&new_item).await {
            Ok(()) => {
                // The insert has already succeeded; a failed refresh only
                // leaves the view stale and logs inside fetch
                let _ = self.fetch().await;
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                debug!("cart row already exists store-side, merging quantities");
                self.fetch().await?;
                match self.find_product(product_id) {
                    Some((item_id, existing)) => {
                        self.update_quantity(item_id, existing + quantity).await
                    }
                    None => Err(e),
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to add item to cart");
                Err(e)
            }
        }
    }

    /// Set an item's quantity. Zero or less removes the item instead.
    ///
    /// On success only the matching line is patched; the product snapshot is
    /// not refreshed here. The patch is dropped if a newer mutation for the
    /// same item was issued while this one was in flight.
    ///
    /// # Errors
    ///
    /// Returns the store error on failure; local state is left untouched.
    #[instrument(skip(self), fields(item_id = %item_id, quantity))]
    pub async fn update_quantity(
        &self,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), StoreError> {
        if quantity <= 0 {
            return self.remove(item_id).await;
        }

        let seq = self.state().issue_for(item_id);

        match self
            .ctx
            .store
            .update_cart_item_quantity(item_id, quantity)
            .await
        {
            Ok(()) => {
                let mut state = self.state();
                if state.is_current(item_id, seq) {
                    if let Some(item) = state.items.iter_mut().find(|item| item.id == item_id) {
                        item.quantity = quantity;
                    }
                } else {
                    debug!("discarding stale quantity response");
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to update quantity");
                Err(e)
            }
        }
    }

    /// Remove an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns the store error on failure; local state is left untouched.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove(&self, item_id: CartItemId) -> Result<(), StoreError> {
        self.state().issue_for(item_id);

        match self.ctx.store.delete_cart_item(item_id).await {
            Ok(()) => {
                let mut state = self.state();
                state.items.retain(|item| item.id != item_id);
                state.item_issues.remove(&item_id);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to remove item");
                Err(e)
            }
        }
    }

    /// Delete every row in the user's cart and collapse local state.
    ///
    /// # Errors
    ///
    /// Returns the store error on failure; local state is left untouched.
    #[instrument(skip(self), fields(user_id = %self.ctx.user_id))]
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.state().issue();

        match self.ctx.store.delete_cart(self.ctx.user_id).await {
            Ok(()) => {
                let mut state = self.state();
                state.items.clear();
                state.item_issues.clear();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to clear cart");
                Err(e)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
