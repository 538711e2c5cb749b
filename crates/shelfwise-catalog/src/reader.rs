use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shelfwise_models::product::{ProductData, ProductId};
use tracing::debug;

use crate::error::CatalogError;
use crate::memory::MemoryCache;
use crate::source::ProductSource;
use crate::sqlite::SqliteCatalog;

/// Read-through catalog: checks moka (hot) → SQLite → empty defaults.
///
/// SQLite hits are promoted to the moka cache. Misses are not cached, so a
/// product added to the catalog later becomes visible on the next read.
///
/// SQLite access is synchronized via `Mutex` since `rusqlite::Connection` is not `Sync`.
pub struct CatalogReader {
    memory: MemoryCache,
    sqlite: Mutex<SqliteCatalog>,
}

impl CatalogReader {
    pub fn new(sqlite: SqliteCatalog, max_capacity: u64, memory_ttl: Duration) -> Self {
        Self {
            memory: MemoryCache::new(max_capacity, memory_ttl),
            sqlite: Mutex::new(sqlite),
        }
    }

    fn with_sqlite<T>(
        &self,
        f: impl FnOnce(&SqliteCatalog) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let sqlite = self
            .sqlite
            .lock()
            .map_err(|e| CatalogError::Unavailable(format!("SQLite mutex poisoned: {e}")))?;
        f(&sqlite)
    }

    /// Number of entries in the hot moka cache.
    pub fn hot_cache_size(&self) -> u64 {
        self.memory.entry_count()
    }
}

#[async_trait]
impl ProductSource for CatalogReader {
    async fn get_data(&self, product_id: ProductId) -> Result<ProductData, CatalogError> {
        if let Some(data) = self.memory.product(product_id).await {
            debug!(product_id, "Catalog hot hit");
            return Ok(data.as_ref().clone());
        }

        let data = self.with_sqlite(|sqlite| sqlite.product(product_id))?;
        match data {
            Some(data) => {
                self.memory
                    .insert_product(product_id, Arc::new(data.clone()))
                    .await;
                Ok(data)
            }
            None => {
                debug!(product_id, "Product not in catalog");
                Ok(ProductData::default())
            }
        }
    }

    async fn get_stock(&self, product_id: ProductId) -> Result<u64, CatalogError> {
        if let Some(quantity) = self.memory.stock(product_id).await {
            return Ok(quantity);
        }

        let quantity = self.with_sqlite(|sqlite| sqlite.stock(product_id))?;
        match quantity {
            Some(quantity) => {
                self.memory.insert_stock(product_id, quantity).await;
                Ok(quantity)
            }
            None => Ok(0),
        }
    }
}
