use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use shelfwise_catalog::ProductSource;
use shelfwise_models::clock::Clock;
use shelfwise_models::config::PipelineConfig;
use shelfwise_models::forecast::ForecastResult;
use shelfwise_models::pricing::PriceResult;
use shelfwise_models::product::ProductId;
use shelfwise_models::purchase::PurchaseResult;
use shelfwise_models::stage::{FailedStep, Stage, StageContext, StageRequest};
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use crate::collaborator::DecisionCollaborator;
use crate::error::{CollaboratorError, PipelineError};

/// One decision collaborator per stage.
#[derive(Clone)]
pub struct Collaborators {
    pub forecast: Arc<dyn DecisionCollaborator>,
    pub pricing: Arc<dyn DecisionCollaborator>,
    pub purchase: Arc<dyn DecisionCollaborator>,
}

impl Collaborators {
    /// Use the same collaborator for every stage.
    pub fn uniform(collaborator: Arc<dyn DecisionCollaborator>) -> Self {
        Self {
            forecast: Arc::clone(&collaborator),
            pricing: Arc::clone(&collaborator),
            purchase: collaborator,
        }
    }

    fn for_stage(&self, stage: Stage) -> &Arc<dyn DecisionCollaborator> {
        match stage {
            Stage::Forecast => &self.forecast,
            Stage::Pricing => &self.pricing,
            Stage::Purchase => &self.purchase,
        }
    }
}

/// The three validated records of a successful run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Optimization {
    pub product_id: ProductId,
    pub forecast: ForecastResult,
    pub pricing: PriceResult,
    pub purchase: PurchaseResult,
}

impl Optimization {
    pub fn into_parts(self) -> (ForecastResult, PriceResult, PurchaseResult) {
        (self.forecast, self.pricing, self.purchase)
    }
}

/// Diagnostics for a failed run. No stage output is retained.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunFailure {
    pub product_id: ProductId,
    pub step: FailedStep,
    pub diagnostic: String,
}

/// What a caller of [`Orchestrator::optimize`] gets back: all three records or none.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Optimization),
    Failed(RunFailure),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn optimization(&self) -> Option<&Optimization> {
        match self {
            Outcome::Completed(optimization) => Some(optimization),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }

    pub fn into_records(self) -> Option<(ForecastResult, PriceResult, PurchaseResult)> {
        match self {
            Outcome::Completed(optimization) => Some(optimization.into_parts()),
            Outcome::Failed(_) => None,
        }
    }
}

/// Runs forecast → pricing → purchase for one product and checks the results agree.
///
/// Stages run strictly in sequence. Any failure ends the run; nothing is retried.
/// The orchestrator holds no per-run state, so one instance can serve
/// concurrent runs behind an `Arc`.
pub struct Orchestrator {
    catalog: Arc<dyn ProductSource>,
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn ProductSource>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            collaborators,
            clock,
            config,
        }
    }

    /// Optimize one product. Errors are logged and folded into [`Outcome::Failed`].
    pub async fn optimize(&self, product_id: ProductId) -> Outcome {
        self.optimize_until_cancelled(product_id, &CancellationToken::new())
            .await
    }

    /// Like [`optimize`](Self::optimize), but gives up at the next suspension
    /// point once `cancel` fires.
    pub async fn optimize_until_cancelled(
        &self,
        product_id: ProductId,
        cancel: &CancellationToken,
    ) -> Outcome {
        match self.run_until_cancelled(product_id, cancel).await {
            Ok(optimization) => Outcome::Completed(optimization),
            Err(e) => {
                let step = e.failed_step();
                warn!(product_id, step = %step, error = %e, "Optimization failed");
                Outcome::Failed(RunFailure {
                    product_id,
                    step,
                    diagnostic: e.to_string(),
                })
            }
        }
    }

    /// Typed variant of [`optimize`](Self::optimize) for callers that want the error.
    pub async fn run(&self, product_id: ProductId) -> Result<Optimization, PipelineError> {
        self.run_until_cancelled(product_id, &CancellationToken::new())
            .await
    }

    pub async fn run_until_cancelled(
        &self,
        product_id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<Optimization, PipelineError> {
        let start = Instant::now();
        let started_at = self.clock.now();
        info!(product_id, "Starting optimization");

        // 1. Snapshot catalog data once for the whole run
        let catalog = Arc::clone(&self.catalog);
        let (product_data, stock) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PipelineError::Cancelled { step: FailedStep::Forecast });
            }
            snapshot = async {
                tokio::try_join!(catalog.get_data(product_id), catalog.get_stock(product_id))
            } => snapshot?,
        };
        if product_data.is_empty() {
            debug!(product_id, "Product has no catalog data");
        }
        let snapshot = StageContext {
            product_data,
            stock,
            ..Default::default()
        };

        // 2. Forecast
        let raw = self
            .invoke(
                StageRequest::new(
                    Stage::Forecast,
                    product_id,
                    format!("Generate forecast for product {product_id}"),
                    snapshot.clone(),
                ),
                cancel,
            )
            .await?;
        let forecast = ForecastResult::from_raw(&raw)
            .map_err(|e| PipelineError::stage(Stage::Forecast, e))?;
        info!(
            product_id,
            predicted_demand = %forecast.predicted_demand(),
            suggested_stock_level = forecast.suggested_stock_level(),
            "Forecast accepted"
        );

        // 3. Pricing, steered by the forecast's advisory price
        let recommendation = forecast.price_recommendation();
        let raw = self
            .invoke(
                StageRequest::new(
                    Stage::Pricing,
                    product_id,
                    format!(
                        "Optimize pricing for product {product_id} with suggested price {recommendation}"
                    ),
                    StageContext {
                        price_recommendation: Some(recommendation),
                        ..snapshot.clone()
                    },
                ),
                cancel,
            )
            .await?;
        let pricing =
            PriceResult::from_raw(&raw).map_err(|e| PipelineError::stage(Stage::Pricing, e))?;
        info!(product_id, suggested_price = %pricing.suggested_price(), "Pricing accepted");

        // 4. Purchase, sized by the forecast and scheduled past the lead time
        let lead_days = self.config.delivery_lead_days;
        let deliver_after = chrono::TimeDelta::try_days(i64::from(lead_days))
            .and_then(|lead| started_at.checked_add_signed(lead))
            .ok_or(PipelineError::LeadTimeOutOfRange { lead_days })?;
        let raw = self
            .invoke(
                StageRequest::new(
                    Stage::Purchase,
                    product_id,
                    format!(
                        "Generate purchase order for product {product_id} with delivery after {}",
                        deliver_after.to_rfc3339()
                    ),
                    StageContext {
                        suggested_stock_level: Some(forecast.suggested_stock_level()),
                        deliver_after: Some(deliver_after),
                        ..snapshot
                    },
                ),
                cancel,
            )
            .await?;
        let purchase = PurchaseResult::from_raw(&raw, self.clock.now())
            .map_err(|e| PipelineError::stage(Stage::Purchase, e))?;
        info!(
            product_id,
            quantity = purchase.quantity(),
            total_cost = %purchase.total_cost(),
            "Purchase accepted"
        );

        // 5. Every record must describe the requested product
        check_consistency(product_id, &forecast, &pricing, &purchase)?;

        info!(
            product_id,
            elapsed_ms = start.elapsed().as_millis(),
            "Optimization complete"
        );

        Ok(Optimization {
            product_id,
            forecast,
            pricing,
            purchase,
        })
    }

    /// Ask the stage's collaborator for raw fields.
    ///
    /// The call runs on its own task so a panicking collaborator becomes a
    /// stage failure; the task is aborted if the run is cancelled or dropped.
    async fn invoke(
        &self,
        request: StageRequest,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, PipelineError> {
        let stage = request.stage;
        let collaborator = Arc::clone(self.collaborators.for_stage(stage));
        let name = collaborator.name().to_string();
        let agent_start = Instant::now();
        debug!(stage = %stage, collaborator = %name, request_id = %request.request_id, "Invoking collaborator");

        let handle = AbortOnDropHandle::new(tokio::spawn(async move {
            collaborator.produce(&request).await
        }));

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(stage = %stage, collaborator = %name, "Run cancelled mid-stage");
                return Err(PipelineError::Cancelled { step: stage.into() });
            }
            joined = handle => joined,
        };

        let elapsed_ms = agent_start.elapsed().as_millis();
        let result = joined
            .map_err(|e| CollaboratorError::Aborted(e.to_string()))
            .and_then(|produced| produced);

        match result {
            Ok(raw) => {
                debug!(stage = %stage, collaborator = %name, elapsed_ms, "Collaborator succeeded");
                Ok(raw)
            }
            Err(e) => {
                warn!(stage = %stage, collaborator = %name, error = %e, elapsed_ms, "Collaborator failed");
                Err(PipelineError::stage(stage, e))
            }
        }
    }
}

/// All three records must carry the product id the run was started for.
pub fn check_consistency(
    expected: ProductId,
    forecast: &ForecastResult,
    pricing: &PriceResult,
    purchase: &PurchaseResult,
) -> Result<(), PipelineError> {
    let ids = [
        forecast.product_id(),
        pricing.product_id(),
        purchase.product_id(),
    ];
    if ids.iter().all(|id| *id == expected) {
        return Ok(());
    }
    Err(PipelineError::Consistency {
        expected,
        forecast: ids[0],
        pricing: ids[1],
        purchase: ids[2],
    })
}
