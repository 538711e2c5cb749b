use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u64;

/// Static per-product data held by the catalog.
///
/// Every field is optional: an unknown product resolves to
/// `ProductData::default()` rather than an error, and it is up to the
/// stage collaborators (and ultimately record validation) to decide whether
/// a legal record can still be produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub market_data: MarketData,
}

impl ProductData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Market snapshot used by the forecast stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketData {
    /// Competitor name -> their current price.
    pub competitor_prices: BTreeMap<String, Decimal>,
    /// Participant name -> share of the market (0.0 to 1.0). Our own share is keyed `Us`.
    pub market_share: BTreeMap<String, Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_market_size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonality_factor: Option<Decimal>,
}

/// Key under which our own market share is recorded.
pub const OWN_SHARE_KEY: &str = "Us";

impl MarketData {
    pub fn own_share(&self) -> Option<Decimal> {
        self.market_share.get(OWN_SHARE_KEY).copied()
    }

    /// Mean competitor price, if any competitor is known.
    pub fn average_competitor_price(&self) -> Option<Decimal> {
        if self.competitor_prices.is_empty() {
            return None;
        }
        let sum: Decimal = self.competitor_prices.values().copied().sum();
        Some(sum / Decimal::from(self.competitor_prices.len()))
    }
}
