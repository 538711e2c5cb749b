use async_trait::async_trait;
use shelfwise_models::product::{ProductData, ProductId};

use crate::error::CatalogError;

/// Read-only access to per-product master data and stock.
///
/// Lookups for an unknown product succeed with `ProductData::default()` and
/// a stock of `0`. Errors are reserved for the backing store itself failing.
/// Implementations must tolerate concurrent readers.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn get_data(&self, product_id: ProductId) -> Result<ProductData, CatalogError>;

    async fn get_stock(&self, product_id: ProductId) -> Result<u64, CatalogError>;
}
