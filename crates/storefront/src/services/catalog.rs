//! Catalog service.
//!
//! Read-side product browsing over any [`RemoteStore`], with an in-process
//! cache in front. Product data changes rarely and is read on every page,
//! so listings and single products are cached for 5 minutes.

use std::time::Duration;

use luxe_core::ProductId;
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::store::types::{Product, ProductFilter};
use crate::store::{RemoteStore, StoreError};

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Cached read access to the product catalog.
///
/// Cloning is cheap; clones share one cache.
#[derive(Clone)]
pub struct Catalog<S> {
    store: S,
    cache: Cache<String, CacheValue>,
}

impl<S: RemoteStore> Catalog<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { store, cache }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the store request
    /// fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, StoreError> {
        let cache_key = format!("product:{product_id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.store.product(product_id).await?;

        // Cache the result
        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List products matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let cache_key = products_key(filter);

        // Check cache
        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = self.store.products(filter).await?;

        // Cache the result
        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// The home-page rail: up to four featured products.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn featured(&self) -> Result<Vec<Product>, StoreError> {
        self.products(&ProductFilter::featured_rail()).await
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

fn products_key(filter: &ProductFilter) -> String {
    format!(
        "products:{}:{}:{}",
        filter.category.as_deref().unwrap_or("*"),
        filter
            .featured
            .map_or_else(|| "*".to_string(), |featured| featured.to_string()),
        filter
            .limit
            .map_or_else(|| "*".to_string(), |limit| limit.to_string()),
    )
}

// ============================================================================
// Tests
// ============================================================================
