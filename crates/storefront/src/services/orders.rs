//! Order history service.
//!
//! Reads past orders for the account page. Deliberately uncached: a
//! just-placed order has to show up the moment the user lands here.

use luxe_core::UserId;
use tracing::instrument;

use crate::store::types::Order;
use crate::store::{RemoteStore, StoreError};

/// Read access to a user's past orders.
#[derive(Clone)]
pub struct OrderHistory<S> {
    store: S,
}

impl<S: RemoteStore> OrderHistory<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All orders for the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.store.orders(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use luxe_core::{OrderStatus, ShippingAddress, ShippingInput};
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::types::NewOrder;

    fn address() -> ShippingAddress {
        ShippingAddress::parse(ShippingInput {
            full_name: "Avery Quinn".to_string(),
            address: "500 Mercer Street".to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            zip_code: "98109".to_string(),
            country: "US".to_string(),
        })
        .unwrap()
    }

    async fn place(store: &MemoryStore, user_id: UserId, total: Decimal) -> Order {
        store
            .insert_order(&NewOrder {
                user_id,
                total,
                shipping_address: address(),
                status: OrderStatus::Confirmed,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_returns_newest_first() {
        let store = MemoryStore::new();
        let user_id = UserId::new();
        let history = OrderHistory::new(store.clone());
        let first = place(&store, user_id, Decimal::from(40)).await;
        let second = place(&store, user_id, Decimal::from(90)).await;

        let orders = history.list(user_id).await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_the_user() {
        let store = MemoryStore::new();
        let ours = UserId::new();
        let theirs = UserId::new();
        let history = OrderHistory::new(store.clone());
        place(&store, ours, Decimal::from(40)).await;
        place(&store, theirs, Decimal::from(90)).await;

        let orders = history.list(ours).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].user_id, ours);
    }

    #[tokio::test]
    async fn test_fresh_user_has_an_empty_history() {
        let store = MemoryStore::new();
        let history = OrderHistory::new(store);

        let orders = history.list(UserId::new()).await.unwrap();

        assert!(orders.is_empty());
    }
}
