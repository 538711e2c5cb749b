use shelfwise_catalog::CatalogError;
use shelfwise_models::product::ProductId;
use shelfwise_models::stage::{FailedStep, Stage};
use shelfwise_models::ValidationError;
use thiserror::Error;

/// A decision collaborator could not produce raw fields.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Collaborator response parse error: {0}")]
    Parse(String),

    #[error("Collaborator timed out after {0} seconds")]
    Timeout(u64),

    #[error("Insufficient data for {stage}: {reason}")]
    InsufficientData { stage: Stage, reason: String },

    #[error("Collaborator for {expected} received a {got} request")]
    Misrouted { expected: Stage, got: Stage },

    #[error("Collaborator task aborted: {0}")]
    Aborted(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single stage failed: the collaborator errored, or its output was illegal.
#[derive(Error, Debug)]
pub enum StageFault {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{stage} stage failed: {source}")]
    StageFailure {
        stage: Stage,
        #[source]
        source: StageFault,
    },

    #[error(
        "Product ID mismatch: requested {expected}, forecast {forecast}, pricing {pricing}, purchase {purchase}"
    )]
    Consistency {
        expected: ProductId,
        forecast: ProductId,
        pricing: ProductId,
        purchase: ProductId,
    },

    #[error("Delivery lead time of {lead_days} days cannot be scheduled from the run start")]
    LeadTimeOutOfRange { lead_days: u32 },

    #[error("Run cancelled during {step}")]
    Cancelled { step: FailedStep },
}

impl PipelineError {
    pub fn stage(stage: Stage, source: impl Into<StageFault>) -> Self {
        Self::StageFailure {
            stage,
            source: source.into(),
        }
    }

    /// The step the run stopped at. Catalog reads happen before the forecast
    /// stage and are attributed to it.
    pub fn failed_step(&self) -> FailedStep {
        match self {
            Self::Catalog(_) => FailedStep::Forecast,
            Self::StageFailure { stage, .. } => FailedStep::from(*stage),
            Self::LeadTimeOutOfRange { .. } => FailedStep::Purchase,
            Self::Consistency { .. } => FailedStep::Consistency,
            Self::Cancelled { step } => *step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_failure_reports_its_stage() {
        let err = PipelineError::stage(
            Stage::Pricing,
            ValidationError::cross_field("pricing", "suggested price 150 is outside the allowed range [110, 130]"),
        );
        assert_eq!(err.failed_step(), FailedStep::Pricing);
        assert_eq!(
            err.to_string(),
            "pricing stage failed: pricing: suggested price 150 is outside the allowed range [110, 130]"
        );
    }

    #[test]
    fn consistency_is_its_own_step() {
        let err = PipelineError::Consistency {
            expected: 1,
            forecast: 1,
            pricing: 2,
            purchase: 1,
        };
        assert_eq!(err.failed_step(), FailedStep::Consistency);
        assert!(err.to_string().contains("pricing 2"));
    }

    #[test]
    fn catalog_errors_count_against_forecast() {
        let err = PipelineError::from(CatalogError::Unavailable("down".to_string()));
        assert_eq!(err.failed_step(), FailedStep::Forecast);
    }

    #[test]
    fn unschedulable_lead_time_counts_against_purchase() {
        let err = PipelineError::LeadTimeOutOfRange { lead_days: u32::MAX };
        assert_eq!(err.failed_step(), FailedStep::Purchase);
        assert!(err.to_string().contains("4294967295 days"));
    }
}
