//! Deterministic collaborator that derives every stage from catalog data.
//!
//! Useful as a default backend and as a reference for what a legal record
//! looks like. It computes candidates; it does not validate them.

use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shelfwise_models::forecast::{ForecastDraft, MarketSignal, STOCK_BUFFER};
use shelfwise_models::pricing::{PriceDraft, PricingStrategy};
use shelfwise_models::purchase::PurchaseDraft;
use shelfwise_models::stage::{Stage, StageRequest};

use crate::collaborator::DecisionCollaborator;
use crate::error::CollaboratorError;

/// Forecasts are per month; market size is per year.
const PERIODS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
/// Growth at or above 3% flags the product as trending.
const TRENDING_GROWTH: Decimal = Decimal::from_parts(3, 0, 0, false, 2);
/// Seasonality outside [0.9, 1.1] flags the product as seasonal.
const SEASONAL_LOW: Decimal = Decimal::from_parts(9, 0, 0, false, 1);
const SEASONAL_HIGH: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

pub struct RuleBasedCollaborator {
    name: String,
}

impl RuleBasedCollaborator {
    pub fn new() -> Self {
        Self {
            name: "rules".to_string(),
        }
    }
}

impl Default for RuleBasedCollaborator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionCollaborator for RuleBasedCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, request: &StageRequest) -> Result<serde_json::Value, CollaboratorError> {
        let raw = match request.stage {
            Stage::Forecast => serde_json::to_value(forecast(request)?)?,
            Stage::Pricing => serde_json::to_value(pricing(request)?)?,
            Stage::Purchase => serde_json::to_value(purchase(request)?)?,
        };
        Ok(raw)
    }
}

fn insufficient(stage: Stage, reason: &str) -> CollaboratorError {
    CollaboratorError::InsufficientData {
        stage,
        reason: reason.to_string(),
    }
}

/// Monthly demand = yearly market size x our share x (1 + growth) x seasonality / 12.
pub fn forecast(request: &StageRequest) -> Result<ForecastDraft, CollaboratorError> {
    let stage = Stage::Forecast;
    let data = &request.context.product_data;
    let market = &data.market_data;

    let size = market
        .total_market_size
        .ok_or_else(|| insufficient(stage, "total_market_size missing"))?;
    let share = market
        .own_share()
        .ok_or_else(|| insufficient(stage, "own market share missing"))?;
    let growth = market.growth_rate.unwrap_or(Decimal::ZERO);
    let seasonality = market.seasonality_factor.unwrap_or(Decimal::ONE);

    let predicted_demand = (size * share * (Decimal::ONE + growth) * seasonality / PERIODS_PER_YEAR)
        .round_dp(2);

    let price_recommendation = market
        .average_competitor_price()
        .or_else(|| midpoint(data.min_price, data.max_price))
        .ok_or_else(|| insufficient(stage, "no competitor prices or price range"))?
        .round_dp(2);

    let suggested_stock_level = (predicted_demand * STOCK_BUFFER)
        .ceil()
        .to_i64()
        .ok_or_else(|| insufficient(stage, "stock level out of range"))?;

    let stock = Decimal::from(request.context.stock);
    let mut market_signals = Vec::new();
    if stock < predicted_demand {
        market_signals.push(MarketSignal::HighDemand);
    } else if stock > predicted_demand * Decimal::TWO {
        market_signals.push(MarketSignal::LowDemand);
    }
    if growth >= TRENDING_GROWTH {
        market_signals.push(MarketSignal::Trending);
    }
    if !(SEASONAL_LOW..=SEASONAL_HIGH).contains(&seasonality) {
        market_signals.push(MarketSignal::Seasonal);
    }

    // Each optional input we actually had raises confidence by 0.1.
    let known_inputs = [
        market.growth_rate.is_some(),
        market.seasonality_factor.is_some(),
        !market.competitor_prices.is_empty(),
    ]
    .into_iter()
    .filter(|known| *known)
    .count();
    let confidence = Decimal::new(5, 1) + Decimal::new(1, 1) * Decimal::from(known_inputs);

    Ok(ForecastDraft {
        product_id: request.product_id,
        predicted_demand,
        confidence,
        market_signals,
        suggested_stock_level,
        price_recommendation,
    })
}

/// Follow the forecast's recommendation, clamped into the catalog range.
pub fn pricing(request: &StageRequest) -> Result<PriceDraft, CollaboratorError> {
    let stage = Stage::Pricing;
    let data = &request.context.product_data;

    let base_cost = data
        .base_cost
        .ok_or_else(|| insufficient(stage, "base_cost missing"))?;
    let (min_price, max_price) = match (data.min_price, data.max_price) {
        (Some(min), Some(max)) if min <= max => (min, max),
        (Some(_), Some(_)) => return Err(insufficient(stage, "min_price exceeds max_price")),
        _ => return Err(insufficient(stage, "price range missing")),
    };

    let (suggested_price, strategy) = match request.context.price_recommendation {
        Some(target) if (min_price..=max_price).contains(&target) => {
            (target, PricingStrategy::MarketBased)
        }
        Some(target) => (target.clamp(min_price, max_price), PricingStrategy::Dynamic),
        None => {
            let cost_plus = (base_cost * Decimal::new(12, 1)).round_dp(2);
            (cost_plus.clamp(min_price, max_price), PricingStrategy::CostPlus)
        }
    };

    let margin = if suggested_price > Decimal::ZERO {
        ((suggested_price - base_cost) / suggested_price)
            .round_dp(4)
            .max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    Ok(PriceDraft {
        product_id: request.product_id,
        base_cost,
        suggested_price,
        min_price,
        max_price,
        strategy,
        margin,
    })
}

/// Order enough to reach the forecast's stock target, one day after the earliest allowed delivery.
pub fn purchase(request: &StageRequest) -> Result<PurchaseDraft, CollaboratorError> {
    let stage = Stage::Purchase;
    let context = &request.context;
    let data = &context.product_data;

    let supplier_id = data
        .supplier
        .clone()
        .ok_or_else(|| insufficient(stage, "supplier missing"))?;
    let unit_cost = data
        .base_cost
        .ok_or_else(|| insufficient(stage, "base_cost missing"))?;
    let deliver_after = context
        .deliver_after
        .ok_or_else(|| insufficient(stage, "deliver_after missing"))?;
    let target = context
        .suggested_stock_level
        .ok_or_else(|| insufficient(stage, "suggested_stock_level missing"))?;

    let shortfall = target.saturating_sub(context.stock).max(1);
    let quantity = i64::try_from(shortfall).map_err(|_| insufficient(stage, "quantity out of range"))?;

    Ok(PurchaseDraft {
        product_id: request.product_id,
        supplier_id,
        quantity,
        unit_cost,
        total_cost: Some(Decimal::from(quantity) * unit_cost),
        expected_delivery: deliver_after + Duration::days(1),
        priority: priority_for(context.stock, target),
    })
}

/// 1 when stock covers under a quarter of the target, up to 5 when it covers all of it.
fn priority_for(stock: u64, target: u64) -> i64 {
    if target == 0 || stock >= target {
        return 5;
    }
    let quarters = stock.saturating_mul(4) / target;
    1 + i64::try_from(quarters).unwrap_or(3)
}

fn midpoint(min: Option<Decimal>, max: Option<Decimal>) -> Option<Decimal> {
    Some((min? + max?) / Decimal::TWO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use shelfwise_models::product::{MarketData, ProductData};
    use shelfwise_models::stage::StageContext;
    use std::collections::BTreeMap;

    fn demo_data() -> ProductData {
        ProductData {
            base_cost: Some(dec!(100)),
            min_price: Some(dec!(110)),
            max_price: Some(dec!(130)),
            supplier: Some("SUP1".to_string()),
            market_data: MarketData {
                competitor_prices: BTreeMap::from([
                    ("Comp1".to_string(), dec!(120)),
                    ("Comp2".to_string(), dec!(130)),
                ]),
                market_share: BTreeMap::from([
                    ("Comp1".to_string(), dec!(0.4)),
                    ("Comp2".to_string(), dec!(0.3)),
                    ("Us".to_string(), dec!(0.3)),
                ]),
                total_market_size: Some(dec!(10000)),
                growth_rate: Some(dec!(0.05)),
                seasonality_factor: Some(dec!(1.0)),
            },
        }
    }

    fn request(stage: Stage, context: StageContext) -> StageRequest {
        StageRequest::new(stage, 1, format!("{stage} for product 1"), context)
    }

    fn base_context() -> StageContext {
        StageContext {
            product_data: demo_data(),
            stock: 100,
            ..Default::default()
        }
    }

    #[test]
    fn forecast_from_demo_data() {
        let draft = forecast(&request(Stage::Forecast, base_context())).unwrap();
        assert_eq!(draft.product_id, 1);
        assert_eq!(draft.predicted_demand, dec!(262.5));
        assert_eq!(draft.price_recommendation, dec!(125));
        assert_eq!(draft.suggested_stock_level, 315);
        assert_eq!(draft.confidence, dec!(0.8));
        assert_eq!(
            draft.market_signals,
            vec![MarketSignal::HighDemand, MarketSignal::Trending]
        );
    }

    #[test]
    fn forecast_flags_seasonal_and_low_demand() {
        let mut context = base_context();
        context.stock = 10_000;
        context.product_data.market_data.seasonality_factor = Some(dec!(1.5));
        context.product_data.market_data.growth_rate = Some(dec!(0.01));

        let draft = forecast(&request(Stage::Forecast, context)).unwrap();
        assert_eq!(
            draft.market_signals,
            vec![MarketSignal::LowDemand, MarketSignal::Seasonal]
        );
    }

    #[test]
    fn forecast_without_market_data_is_insufficient() {
        let context = StageContext::default();
        assert!(matches!(
            forecast(&request(Stage::Forecast, context)),
            Err(CollaboratorError::InsufficientData {
                stage: Stage::Forecast,
                ..
            })
        ));
    }

    #[test]
    fn pricing_follows_recommendation_in_range() {
        let context = StageContext {
            price_recommendation: Some(dec!(125)),
            ..base_context()
        };
        let draft = pricing(&request(Stage::Pricing, context)).unwrap();
        assert_eq!(draft.suggested_price, dec!(125));
        assert_eq!(draft.strategy, PricingStrategy::MarketBased);
        assert_eq!(draft.margin, dec!(0.2));
    }

    #[test]
    fn pricing_clamps_out_of_range_recommendation() {
        let context = StageContext {
            price_recommendation: Some(dec!(180)),
            ..base_context()
        };
        let draft = pricing(&request(Stage::Pricing, context)).unwrap();
        assert_eq!(draft.suggested_price, dec!(130));
        assert_eq!(draft.strategy, PricingStrategy::Dynamic);
    }

    #[test]
    fn pricing_without_recommendation_is_cost_plus() {
        let draft = pricing(&request(Stage::Pricing, base_context())).unwrap();
        assert_eq!(draft.suggested_price, dec!(120));
        assert_eq!(draft.strategy, PricingStrategy::CostPlus);
    }

    #[test]
    fn purchase_fills_the_shortfall() {
        let deliver_after = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        let context = StageContext {
            suggested_stock_level: Some(315),
            deliver_after: Some(deliver_after),
            ..base_context()
        };
        let draft = purchase(&request(Stage::Purchase, context)).unwrap();
        assert_eq!(draft.supplier_id, "SUP1");
        assert_eq!(draft.quantity, 215);
        assert_eq!(draft.unit_cost, dec!(100));
        assert_eq!(draft.total_cost, Some(dec!(21500)));
        assert_eq!(draft.expected_delivery, deliver_after + Duration::days(1));
        assert_eq!(draft.priority, 2);
    }

    #[test]
    fn purchase_orders_at_least_one_unit() {
        let context = StageContext {
            suggested_stock_level: Some(50),
            deliver_after: Some(Utc::now()),
            ..base_context()
        };
        let draft = purchase(&request(Stage::Purchase, context)).unwrap();
        assert_eq!(draft.quantity, 1);
        assert_eq!(draft.priority, 5);
    }

    #[test]
    fn priority_scales_with_coverage() {
        assert_eq!(priority_for(0, 100), 1);
        assert_eq!(priority_for(24, 100), 1);
        assert_eq!(priority_for(25, 100), 2);
        assert_eq!(priority_for(60, 100), 3);
        assert_eq!(priority_for(99, 100), 4);
        assert_eq!(priority_for(100, 100), 5);
        assert_eq!(priority_for(5, 0), 5);
    }

    #[tokio::test]
    async fn produce_dispatches_on_stage() {
        let collaborator = RuleBasedCollaborator::new();
        let raw = collaborator
            .produce(&request(Stage::Forecast, base_context()))
            .await
            .unwrap();
        assert_eq!(raw["product_id"], 1);
        assert_eq!(raw["suggested_stock_level"], 315);
    }
}
