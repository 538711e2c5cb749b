use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{parse_draft, ValidationError};
use crate::product::ProductId;

const RECORD: &str = "forecast";

/// Multiplier used when a forecast under-stocks its own predicted demand (1.2).
pub const STOCK_BUFFER: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MarketSignal {
    HighDemand,
    LowDemand,
    Seasonal,
    Trending,
}

/// Unvalidated forecast fields as produced by a decision collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDraft {
    pub product_id: ProductId,
    /// Units expected to be demanded.
    pub predicted_demand: Decimal,
    pub confidence: Decimal,
    pub market_signals: Vec<MarketSignal>,
    pub suggested_stock_level: i64,
    /// Advisory price handed to the pricing stage.
    pub price_recommendation: Decimal,
}

/// A validated demand forecast. Only obtainable through [`ForecastResult::construct`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastResult {
    product_id: ProductId,
    predicted_demand: Decimal,
    confidence: Decimal,
    market_signals: BTreeSet<MarketSignal>,
    suggested_stock_level: u64,
    price_recommendation: Decimal,
}

impl ForecastResult {
    /// Validate a draft.
    ///
    /// A stock level below the predicted demand is repaired to
    /// `ceil(predicted_demand * 1.2)`; every other violation rejects the draft.
    pub fn construct(draft: ForecastDraft) -> Result<Self, ValidationError> {
        if draft.predicted_demand <= Decimal::ZERO {
            return Err(ValidationError::field(
                RECORD,
                "predicted_demand",
                format!("must be > 0, got {}", draft.predicted_demand),
            ));
        }
        if draft.confidence < Decimal::ZERO || draft.confidence > Decimal::ONE {
            return Err(ValidationError::field(
                RECORD,
                "confidence",
                format!("must be within [0, 1], got {}", draft.confidence),
            ));
        }
        if draft.price_recommendation <= Decimal::ZERO {
            return Err(ValidationError::field(
                RECORD,
                "price_recommendation",
                format!("must be > 0, got {}", draft.price_recommendation),
            ));
        }

        let suggested_stock_level =
            repair_stock_level(draft.suggested_stock_level, draft.predicted_demand)?;

        Ok(Self {
            product_id: draft.product_id,
            predicted_demand: draft.predicted_demand,
            confidence: draft.confidence,
            market_signals: draft.market_signals.into_iter().collect(),
            suggested_stock_level,
            price_recommendation: draft.price_recommendation,
        })
    }

    /// Parse and validate a raw JSON mapping.
    pub fn from_raw(raw: &serde_json::Value) -> Result<Self, ValidationError> {
        Self::construct(parse_draft(RECORD, raw)?)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn predicted_demand(&self) -> Decimal {
        self.predicted_demand
    }

    pub fn confidence(&self) -> Decimal {
        self.confidence
    }

    pub fn market_signals(&self) -> &BTreeSet<MarketSignal> {
        &self.market_signals
    }

    pub fn suggested_stock_level(&self) -> u64 {
        self.suggested_stock_level
    }

    pub fn price_recommendation(&self) -> Decimal {
        self.price_recommendation
    }
}

fn repair_stock_level(supplied: i64, predicted_demand: Decimal) -> Result<u64, ValidationError> {
    let level = if Decimal::from(supplied) < predicted_demand {
        predicted_demand
            .checked_mul(STOCK_BUFFER)
            .map(|buffered| buffered.ceil())
            .and_then(|buffered| buffered.to_i64())
            .ok_or_else(|| {
                ValidationError::field(
                    RECORD,
                    "suggested_stock_level",
                    format!("cannot derive a stock level from demand {predicted_demand}"),
                )
            })?
    } else {
        supplied
    };

    u64::try_from(level)
        .ok()
        .filter(|level| *level > 0)
        .ok_or_else(|| {
            ValidationError::field(
                RECORD,
                "suggested_stock_level",
                format!("must be > 0, got {level}"),
            )
        })
}
