use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::{ProductData, ProductId};

/// One of the three decision stages, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Forecast,
    Pricing,
    Purchase,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Forecast, Stage::Pricing, Stage::Purchase];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Forecast => "forecast",
            Stage::Pricing => "pricing",
            Stage::Purchase => "purchase",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a pipeline run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailedStep {
    Forecast,
    Pricing,
    Purchase,
    Consistency,
}

impl From<Stage> for FailedStep {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Forecast => FailedStep::Forecast,
            Stage::Pricing => FailedStep::Pricing,
            Stage::Purchase => FailedStep::Purchase,
        }
    }
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailedStep::Forecast => "forecast",
            FailedStep::Pricing => "pricing",
            FailedStep::Purchase => "purchase",
            FailedStep::Consistency => "consistency",
        })
    }
}

/// Structured context handed to a stage's decision collaborator.
///
/// `product_data` and `stock` are a snapshot taken from the catalog at the
/// start of the run. The optional fields carry what earlier stages decided.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageContext {
    pub product_data: ProductData,
    pub stock: u64,
    /// Forecast's advisory price (pricing stage).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_recommendation: Option<Decimal>,
    /// Forecast's stock target (purchase stage).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_stock_level: Option<u64>,
    /// Earliest acceptable delivery (purchase stage).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_after: Option<DateTime<Utc>>,
}

/// Request sent to a decision collaborator (serialized as JSON for model-backed ones).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageRequest {
    pub request_id: Uuid,
    pub stage: Stage,
    pub product_id: ProductId,
    /// Natural-language task description.
    pub instruction: String,
    pub context: StageContext,
}

impl StageRequest {
    pub fn new(stage: Stage, product_id: ProductId, instruction: String, context: StageContext) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            stage,
            product_id,
            instruction,
            context,
        }
    }
}
