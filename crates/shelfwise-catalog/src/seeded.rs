use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shelfwise_models::product::{MarketData, ProductData, ProductId, OWN_SHARE_KEY};

use crate::error::CatalogError;
use crate::source::ProductSource;

/// Immutable in-memory catalog.
///
/// Built once and then only read, so concurrent runs need no locking.
#[derive(Debug, Clone, Default)]
pub struct SeededCatalog {
    products: HashMap<ProductId, ProductData>,
    stock: HashMap<ProductId, u64>,
}

impl SeededCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product_id: ProductId, data: ProductData, stock: u64) -> Self {
        self.products.insert(product_id, data);
        self.stock.insert(product_id, stock);
        self
    }

    /// Catalog holding the single demo product `1`.
    pub fn demo() -> Self {
        Self::new().with_product(1, demo_product(), 100)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn demo_product() -> ProductData {
    ProductData {
        base_cost: Some(Decimal::new(100, 0)),
        min_price: Some(Decimal::new(110, 0)),
        max_price: Some(Decimal::new(130, 0)),
        supplier: Some("SUP1".to_string()),
        market_data: MarketData {
            competitor_prices: BTreeMap::from([
                ("Comp1".to_string(), Decimal::new(120, 0)),
                ("Comp2".to_string(), Decimal::new(130, 0)),
            ]),
            market_share: BTreeMap::from([
                ("Comp1".to_string(), Decimal::new(4, 1)),
                ("Comp2".to_string(), Decimal::new(3, 1)),
                (OWN_SHARE_KEY.to_string(), Decimal::new(3, 1)),
            ]),
            total_market_size: Some(Decimal::new(10_000, 0)),
            growth_rate: Some(Decimal::new(5, 2)),
            seasonality_factor: Some(Decimal::new(10, 1)),
        },
    }
}

#[async_trait]
impl ProductSource for SeededCatalog {
    async fn get_data(&self, product_id: ProductId) -> Result<ProductData, CatalogError> {
        Ok(self.products.get(&product_id).cloned().unwrap_or_default())
    }

    async fn get_stock(&self, product_id: ProductId) -> Result<u64, CatalogError> {
        Ok(self.stock.get(&product_id).copied().unwrap_or(0))
    }
}
