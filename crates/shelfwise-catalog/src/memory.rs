use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shelfwise_models::catalog_schema::key_patterns;
use shelfwise_models::product::{ProductData, ProductId};

#[derive(Debug, Clone)]
enum Entry {
    Product(Arc<ProductData>),
    Stock(u64),
}

/// In-memory hot cache backed by moka.
///
/// Holds recently read products and stock levels under the
/// `product:{id}` / `stock:{id}` keys. Entries are evicted after TTL.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn product(&self, product_id: ProductId) -> Option<Arc<ProductData>> {
        match self.inner.get(&key_patterns::product(product_id)).await {
            Some(Entry::Product(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn insert_product(&self, product_id: ProductId, data: Arc<ProductData>) {
        self.inner
            .insert(key_patterns::product(product_id), Entry::Product(data))
            .await;
    }

    pub async fn stock(&self, product_id: ProductId) -> Option<u64> {
        match self.inner.get(&key_patterns::stock(product_id)).await {
            Some(Entry::Stock(quantity)) => Some(quantity),
            _ => None,
        }
    }

    pub async fn insert_stock(&self, product_id: ProductId, quantity: u64) {
        self.inner
            .insert(key_patterns::stock(product_id), Entry::Stock(quantity))
            .await;
    }

    pub async fn invalidate(&self, product_id: ProductId) {
        self.inner.invalidate(&key_patterns::product(product_id)).await;
        self.inner.invalidate(&key_patterns::stock(product_id)).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}
