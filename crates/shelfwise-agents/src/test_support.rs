//! Test support: scripted collaborators and known-good raw fields.
//!
//! `ScriptedCollaborator` answers each stage from a script instead of
//! deriving anything, and records every request it receives so tests can
//! assert what the orchestrator passed along (and what it never asked for).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shelfwise_models::product::ProductId;
use shelfwise_models::stage::{Stage, StageRequest};

use crate::collaborator::DecisionCollaborator;
use crate::error::CollaboratorError;

#[derive(Debug, Clone)]
enum Script {
    Respond(serde_json::Value),
    Fail(String),
    Panic,
}

pub struct ScriptedCollaborator {
    name: String,
    scripts: HashMap<Stage, Script>,
    delay: Option<Duration>,
    stage_delays: HashMap<Stage, Duration>,
    requests: Mutex<Vec<StageRequest>>,
}

impl ScriptedCollaborator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scripts: HashMap::new(),
            delay: None,
            stage_delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every stage with valid fields for `product_id`.
    pub fn happy_path(product_id: ProductId) -> Self {
        Self::new("scripted")
            .respond(Stage::Forecast, forecast_fields(product_id))
            .respond(Stage::Pricing, pricing_fields(product_id))
            .respond(
                Stage::Purchase,
                purchase_fields(product_id, Utc::now() + chrono::Duration::days(30)),
            )
    }

    pub fn respond(mut self, stage: Stage, raw: serde_json::Value) -> Self {
        self.scripts.insert(stage, Script::Respond(raw));
        self
    }

    pub fn fail(mut self, stage: Stage, message: &str) -> Self {
        self.scripts.insert(stage, Script::Fail(message.to_string()));
        self
    }

    pub fn panic_on(mut self, stage: Stage) -> Self {
        self.scripts.insert(stage, Script::Panic);
        self
    }

    /// Sleep before answering, to give tests a window to cancel.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before answering `stage` only. Overrides `with_delay` for that stage.
    pub fn delay_on(mut self, stage: Stage, delay: Duration) -> Self {
        self.stage_delays.insert(stage, delay);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<StageRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn stages_called(&self) -> Vec<Stage> {
        self.requests().iter().map(|r| r.stage).collect()
    }
}

#[async_trait]
impl DecisionCollaborator for ScriptedCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, request: &StageRequest) -> Result<serde_json::Value, CollaboratorError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(delay) = self.stage_delays.get(&request.stage).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        match self.scripts.get(&request.stage) {
            Some(Script::Respond(raw)) => Ok(raw.clone()),
            Some(Script::Fail(message)) => Err(CollaboratorError::Cli(message.clone())),
            Some(Script::Panic) => panic!("scripted panic in {} stage", request.stage),
            None => Err(CollaboratorError::Cli(format!(
                "no script for {} stage",
                request.stage
            ))),
        }
    }
}

/// Forecast fields matching the demo product's reference numbers.
pub fn forecast_fields(product_id: ProductId) -> serde_json::Value {
    serde_json::json!({
        "product_id": product_id,
        "predicted_demand": "262.5",
        "confidence": "0.8",
        "market_signals": ["high_demand", "trending"],
        "suggested_stock_level": 315,
        "price_recommendation": "125"
    })
}

pub fn pricing_fields(product_id: ProductId) -> serde_json::Value {
    serde_json::json!({
        "product_id": product_id,
        "base_cost": "100",
        "suggested_price": "125",
        "min_price": "110",
        "max_price": "130",
        "strategy": "market_based",
        "margin": "0.2"
    })
}

pub fn purchase_fields(product_id: ProductId, expected_delivery: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "product_id": product_id,
        "supplier_id": "SUP1",
        "quantity": 215,
        "unit_cost": "100",
        "total_cost": "1",
        "expected_delivery": expected_delivery.to_rfc3339(),
        "priority": 2
    })
}
