//! Shelfwise - retail inventory and pricing optimizer
//!
//! Runs a forecast → pricing → purchase pipeline for one product. Each stage
//! asks a decision collaborator (rule-based or Claude CLI) for raw fields,
//! which are validated into records before the next stage starts.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use shelfwise::models::config::ShelfwiseConfig;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let orchestrator = shelfwise::build_orchestrator(&ShelfwiseConfig::default())?;
//! let outcome = shelfwise::optimize(&orchestrator, 1).await;
//! println!("completed: {}", outcome.is_completed());
//! # Ok(())
//! # }
//! ```

pub use shelfwise_agents as agents;
pub use shelfwise_catalog as catalog;
pub use shelfwise_models as models;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shelfwise_agents::{
    ClaudeCollaborator, Collaborators, DecisionCollaborator, Orchestrator, Outcome,
    RuleBasedCollaborator,
};
use shelfwise_catalog::{CatalogReader, ProductSource, SeededCatalog, SqliteCatalog};
use shelfwise_models::clock::SystemClock;
use shelfwise_models::config::{
    AgentsConfig, CatalogBackend, CatalogConfig, CollaboratorBackend, ShelfwiseConfig,
};
use shelfwise_models::product::ProductId;
use shelfwise_models::stage::Stage;
use tokio_util::sync::CancellationToken;

/// Load configuration from a TOML file. A missing file means defaults.
pub fn load_config(path: &Path) -> anyhow::Result<ShelfwiseConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(ShelfwiseConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Build an Orchestrator from configuration.
pub fn build_orchestrator(config: &ShelfwiseConfig) -> anyhow::Result<Orchestrator> {
    let catalog = build_catalog(&config.catalog)?;
    let collaborators = build_collaborators(&config.agents);

    Ok(Orchestrator::new(
        catalog,
        collaborators,
        Arc::new(SystemClock),
        config.pipeline.clone(),
    ))
}

fn build_catalog(config: &CatalogConfig) -> anyhow::Result<Arc<dyn ProductSource>> {
    match config.backend {
        CatalogBackend::Memory => Ok(Arc::new(SeededCatalog::demo())),
        CatalogBackend::Sqlite => {
            let sqlite = SqliteCatalog::open(&config.sqlite_path)
                .with_context(|| format!("Failed to open catalog: {}", config.sqlite_path))?;
            Ok(Arc::new(CatalogReader::new(
                sqlite,
                config.memory_max_capacity,
                Duration::from_secs(config.memory_ttl_seconds),
            )))
        }
    }
}

fn build_collaborators(config: &AgentsConfig) -> Collaborators {
    match config.backend {
        CollaboratorBackend::Rules => Collaborators::uniform(Arc::new(RuleBasedCollaborator::new())),
        CollaboratorBackend::Claude => {
            let claude = |stage: Stage| -> Arc<dyn DecisionCollaborator> {
                Arc::new(ClaudeCollaborator::new(
                    stage,
                    config.model_for(stage).to_string(),
                    Duration::from_secs(config.timeout_for(stage)),
                ))
            };
            Collaborators {
                forecast: claude(Stage::Forecast),
                pricing: claude(Stage::Pricing),
                purchase: claude(Stage::Purchase),
            }
        }
    }
}

/// Optimize one product using the given orchestrator.
pub async fn optimize(orchestrator: &Orchestrator, product_id: ProductId) -> Outcome {
    orchestrator.optimize(product_id).await
}

/// Cancel `cancel` once `signal` fires. If the signal listener cannot be
/// installed the run is left alone rather than cancelled.
pub async fn cancel_on_signal<S>(signal: S, cancel: CancellationToken)
where
    S: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal; run cannot be interrupted");
        return;
    }
    tracing::info!("Received shutdown signal");
    cancel.cancel();
}
