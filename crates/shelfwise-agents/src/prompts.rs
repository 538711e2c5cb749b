use shelfwise_models::stage::Stage;

/// Shared preamble describing the request every stage receives.
const REQUEST_FORMAT: &str = "\
## INPUT\n\n\
The user message is a JSON `StageRequest`:\n\
- `instruction`: the task for this run\n\
- `product_id`: the product being optimized, an integer; echo it back unchanged\n\
- `context.product_data`: catalog data (`base_cost`, `min_price`, `max_price`, `supplier`, \
`market_data` with `competitor_prices`, `market_share` (our share is `Us`), \
`total_market_size`, `growth_rate`, `seasonality_factor`). Any field may be missing.\n\
- `context.stock`: units currently on hand\n\
- `context.price_recommendation`: the forecast's advisory price (pricing stage only)\n\
- `context.suggested_stock_level`: the forecast's stock target (purchase stage only)\n\
- `context.deliver_after`: RFC 3339 timestamp; delivery must be later (purchase stage only)\n\n\
## OUTPUT\n\n\
Respond ONLY with one JSON object, no prose, matching this shape. Decimals may be \
numbers or numeric strings.\n";

fn output_example(stage: Stage) -> String {
    let example = match stage {
        Stage::Forecast => serde_json::json!({
            "product_id": 1,
            "predicted_demand": "262.5",
            "confidence": "0.8",
            "market_signals": ["high_demand", "trending"],
            "suggested_stock_level": 315,
            "price_recommendation": "125"
        }),
        Stage::Pricing => serde_json::json!({
            "product_id": 1,
            "base_cost": "100",
            "suggested_price": "125",
            "min_price": "110",
            "max_price": "130",
            "strategy": "market_based",
            "margin": "0.2"
        }),
        Stage::Purchase => serde_json::json!({
            "product_id": 1,
            "supplier_id": "SUP1",
            "quantity": 215,
            "unit_cost": "100",
            "total_cost": "21500",
            "expected_delivery": "2025-01-16T00:00:00Z",
            "priority": 2
        }),
    };
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

pub fn forecast_system_prompt() -> String {
    format!(
        "You are the demand forecasting stage of Shelfwise, an inventory and pricing \
         pipeline. Analyze the market data and current stock to forecast demand for the \
         next month.\n\n\
         {REQUEST_FORMAT}\n{}\n\n\
         ## RULES\n\n\
         - `predicted_demand` > 0, in units.\n\
         - `confidence` between 0 and 1 inclusive.\n\
         - `market_signals` uses only: high_demand, low_demand, seasonal, trending.\n\
         - `suggested_stock_level` is an integer >= predicted_demand. Lower values are \
         replaced with ceil(predicted_demand * 1.2).\n\
         - `price_recommendation` > 0; base it on competitor prices when available.\n",
        output_example(Stage::Forecast)
    )
}

pub fn pricing_system_prompt() -> String {
    format!(
        "You are the pricing stage of Shelfwise, an inventory and pricing pipeline. Set \
         the optimal selling price, starting from the forecast's recommendation.\n\n\
         {REQUEST_FORMAT}\n{}\n\n\
         ## RULES\n\n\
         - `min_price` <= `suggested_price` <= `max_price`, copied from the catalog.\n\
         - `suggested_price` must be strictly greater than `base_cost`.\n\
         - `strategy` is one of: cost_plus, market_based, dynamic.\n\
         - `margin` = (suggested_price - base_cost) / suggested_price, never negative.\n\
         Outputs violating a price rule are rejected, not corrected.\n",
        output_example(Stage::Pricing)
    )
}

pub fn purchase_system_prompt() -> String {
    format!(
        "You are the purchasing stage of Shelfwise, an inventory and pricing pipeline. \
         Generate a purchase order that brings stock up to the forecast's target.\n\n\
         {REQUEST_FORMAT}\n{}\n\n\
         ## RULES\n\n\
         - `product_id` must match the input.\n\
         - `supplier_id` is the catalog supplier.\n\
         - `quantity` is a positive integer; aim for suggested_stock_level - stock.\n\
         - `unit_cost` > 0; `total_cost` is recomputed as quantity * unit_cost.\n\
         - `expected_delivery` is RFC 3339 and later than `deliver_after`.\n\
         - `priority` is an integer from 1 (most urgent) to 5.\n",
        output_example(Stage::Purchase)
    )
}

pub fn system_prompt(stage: Stage) -> String {
    match stage {
        Stage::Forecast => forecast_system_prompt(),
        Stage::Pricing => pricing_system_prompt(),
        Stage::Purchase => purchase_system_prompt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_has_a_prompt_with_its_schema() {
        for (stage, field) in [
            (Stage::Forecast, "suggested_stock_level"),
            (Stage::Pricing, "suggested_price"),
            (Stage::Purchase, "expected_delivery"),
        ] {
            let prompt = system_prompt(stage);
            assert!(prompt.contains("StageRequest"), "{stage} prompt lacks input format");
            assert!(prompt.contains(field), "{stage} prompt lacks {field}");
        }
    }

    #[test]
    fn output_examples_are_valid_json_objects() {
        for stage in Stage::ALL {
            let parsed: serde_json::Value = serde_json::from_str(&output_example(stage)).unwrap();
            assert!(parsed.is_object());
        }
    }

    #[test]
    fn output_examples_are_accepted_records() {
        use chrono::TimeZone;
        use shelfwise_models::{ForecastResult, PriceResult, PurchaseResult};

        let example = |stage| serde_json::from_str::<serde_json::Value>(&output_example(stage)).unwrap();
        for stage in Stage::ALL {
            assert!(example(stage)["product_id"].is_u64(), "{stage} example id is not an integer");
        }

        assert_eq!(ForecastResult::from_raw(&example(Stage::Forecast)).unwrap().product_id(), 1);
        assert_eq!(PriceResult::from_raw(&example(Stage::Pricing)).unwrap().product_id(), 1);
        let before_delivery = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            PurchaseResult::from_raw(&example(Stage::Purchase), before_delivery)
                .unwrap()
                .product_id(),
            1
        );
    }
}
