//! REST client for the hosted row store.
//!
//! Speaks the store's row-filter dialect: filters are query parameters
//! (`user_id=eq.<uuid>`, `order=created_at.desc`), the cart read embeds its
//! product join through `select`, and writes ask for minimal responses
//! except the order insert, which needs the stored row back for its
//! assigned id.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use luxe_core::{CartItemId, ProductId, UserId};

use crate::config::StorefrontConfig;

use super::types::{CartItem, NewCartItem, NewOrder, Order, OrderItem, Product, ProductFilter};
use super::{RemoteStore, StoreError};

/// Media type that asks the store for exactly one object instead of an
/// array. A miss then comes back as 406 rather than an empty array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Cart read join: every row plus its embedded product.
const CART_SELECT: &str = "*,product:products(*)";

fn rest_base(url: &Url) -> String {
    format!("{}/rest/v1", url.as_str().trim_end_matches('/'))
}

/// Client for the hosted row store.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct RestStore {
    inner: Arc<RestStoreInner>,
}

struct RestStoreInner {
    client: reqwest::Client,
    base: String,
}

impl RestStore {
    /// Create a new store client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store key cannot be carried in a request
    /// header or the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, StoreError> {
        let key = config.store_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StoreError::InvalidKey(e.to_string()))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StoreError::InvalidKey(e.to_string()))?,
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(RestStoreInner {
                client,
                base: rest_base(&config.store_url),
            }),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{name}", self.inner.base)
    }

    /// Send a read request and parse the JSON body.
    async fn read<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from(status, &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse store response"
            );
            StoreError::Parse(e)
        })
    }

    /// Send a write request, discarding any response body.
    async fn write(&self, request: reqwest::RequestBuilder) -> Result<(), StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from(status, &body));
        }

        Ok(())
    }
}

impl RemoteStore for RestStore {
    #[instrument(skip(self))]
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(category) = &filter.category {
            query.push(("category", format!("eq.{category}")));
        }
        if let Some(featured) = filter.featured {
            query.push(("featured", format!("eq.{featured}")));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }

        let request = self.inner.client.get(self.table("products")).query(&query);
        self.read(request).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        let request = self
            .inner
            .client
            .get(self.table("products"))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .header(ACCEPT, SINGLE_OBJECT);

        match self.read(request).await {
            Err(StoreError::NotFound(_)) => {
                Err(StoreError::NotFound(format!("Product not found: {id}")))
            }
            other => other,
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        let request = self.inner.client.get(self.table("cart_items")).query(&[
            ("select", CART_SELECT.to_string()),
            ("user_id", format!("eq.{user_id}")),
        ]);
        self.read(request).await
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    async fn insert_cart_item(&self, item: &NewCartItem) -> Result<(), StoreError> {
        let request = self
            .inner
            .client
            .post(self.table("cart_items"))
            .header("Prefer", "return=minimal")
            .json(item);
        self.write(request).await
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn update_cart_item_quantity(
        &self,
        id: CartItemId,
        quantity: i32,
    ) -> Result<(), StoreError> {
        let request = self
            .inner
            .client
            .patch(self.table("cart_items"))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "quantity": quantity }));
        self.write(request).await
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete_cart_item(&self, id: CartItemId) -> Result<(), StoreError> {
        let request = self
            .inner
            .client
            .delete(self.table("cart_items"))
            .query(&[("id", format!("eq.{id}"))]);
        self.write(request).await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete_cart(&self, user_id: UserId) -> Result<(), StoreError> {
        let request = self
            .inner
            .client
            .delete(self.table("cart_items"))
            .query(&[("user_id", format!("eq.{user_id}"))]);
        self.write(request).await
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        // The assigned id gates the rest of checkout, so this is the one
        // write that asks for the stored row back
        let request = self
            .inner
            .client
            .post(self.table("orders"))
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(order);
        self.read(request).await
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<(), StoreError> {
        let request = self
            .inner
            .client
            .post(self.table("order_items"))
            .header("Prefer", "return=minimal")
            .json(&items);
        self.write(request).await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let request = self.inner.client.get(self.table("orders")).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("order", "created_at.desc".to_string()),
        ]);
        self.read(request).await
    }
}

fn error_from(status: StatusCode, body: &str) -> StoreError {
    let message = extract_message(body);

    if status == StatusCode::CONFLICT {
        return StoreError::Conflict(message);
    }

    // Single-object reads signal a miss with 406
    if status == StatusCode::NOT_ACCEPTABLE {
        return StoreError::NotFound(message);
    }

    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Pull the `message` field out of a store error body, falling back to a
/// truncated copy of the raw body.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_base_trims_trailing_slash() {
        let url = Url::parse("https://store.example.com/").unwrap();
        assert_eq!(rest_base(&url), "https://store.example.com/rest/v1");

        let url = Url::parse("https://store.example.com").unwrap();
        assert_eq!(rest_base(&url), "https://store.example.com/rest/v1");
    }

    #[test]
    fn test_extract_message_prefers_message_field() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"cart_items_user_id_product_id_key\"","details":null,"hint":null}"#;
        assert!(extract_message(body).starts_with("duplicate key value"));
    }

    #[test]
    fn test_extract_message_falls_back_to_raw_body() {
        assert_eq!(extract_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_error_mapping_by_status() {
        let conflict = error_from(StatusCode::CONFLICT, r#"{"message":"duplicate"}"#);
        assert!(conflict.is_conflict());

        let missing = error_from(StatusCode::NOT_ACCEPTABLE, r#"{"message":"0 rows"}"#);
        assert!(matches!(missing, StoreError::NotFound(_)));

        let other = error_from(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(other, StoreError::Api { status: 500, .. }));
    }
}
