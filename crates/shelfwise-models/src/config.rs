use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Top-level configuration for Shelfwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShelfwiseConfig {
    pub catalog: CatalogConfig,
    pub agents: AgentsConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Built-in demo catalog held in memory.
    #[default]
    Memory,
    /// Read-only SQLite catalog file.
    Sqlite,
}

/// Configuration for the product catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    /// Path to the SQLite catalog (only read when `backend = "sqlite"`).
    pub sqlite_path: String,
    /// Maximum number of products kept in the in-memory moka cache.
    pub memory_max_capacity: u64,
    /// How long a catalog read stays in memory, in seconds.
    pub memory_ttl_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Memory,
            sqlite_path: "data/shelfwise_catalog.db".to_string(),
            memory_max_capacity: 10_000,
            memory_ttl_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorBackend {
    /// Deterministic rules computed from catalog data.
    #[default]
    Rules,
    /// The `claude` CLI with a per-stage system prompt.
    Claude,
}

/// Configuration for the stage collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentsConfig {
    pub backend: CollaboratorBackend,
    /// Default model for model-backed collaborators.
    pub model: String,
    /// Per-call timeout for model-backed collaborators, in seconds.
    pub timeout_seconds: u64,
    /// Per-stage overrides.
    pub stages: Vec<StageAgentConfig>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            backend: CollaboratorBackend::Rules,
            model: "claude-3-5-haiku-latest".to_string(),
            timeout_seconds: 60,
            stages: Vec::new(),
        }
    }
}

impl AgentsConfig {
    fn override_for(&self, stage: Stage) -> Option<&StageAgentConfig> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn model_for(&self, stage: Stage) -> &str {
        self.override_for(stage)
            .and_then(|s| s.model.as_deref())
            .unwrap_or(self.model.as_str())
    }

    pub fn timeout_for(&self, stage: Stage) -> u64 {
        self.override_for(stage)
            .and_then(|s| s.timeout_seconds)
            .unwrap_or(self.timeout_seconds)
    }
}

/// Override for a single stage's collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageAgentConfig {
    pub stage: Stage,
    /// Falls back to `AgentsConfig::model`.
    pub model: Option<String>,
    /// Falls back to `AgentsConfig::timeout_seconds`.
    pub timeout_seconds: Option<u64>,
}

/// Configuration for the orchestrator itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Purchase orders must deliver after run start plus this many days.
    /// Unsigned, so a lead time can never point into the past.
    pub delivery_lead_days: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delivery_lead_days: 14,
        }
    }
}
