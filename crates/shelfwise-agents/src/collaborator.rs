use std::time::Duration;

use async_trait::async_trait;
use shelfwise_models::stage::{Stage, StageRequest};

use crate::claude_cli::{invoke_claude, ClaudeCliConfig};
use crate::error::CollaboratorError;
use crate::parser::extract_object;
use crate::prompts::system_prompt;

/// Produces the raw candidate fields for one stage. Mockable for testing.
///
/// The returned JSON object is validated by the pipeline; a collaborator is
/// free to return anything and let validation reject it.
#[async_trait]
pub trait DecisionCollaborator: Send + Sync {
    fn name(&self) -> &str;

    async fn produce(&self, request: &StageRequest) -> Result<serde_json::Value, CollaboratorError>;
}

/// A collaborator that asks the Claude CLI, with a system prompt for its stage.
pub struct ClaudeCollaborator {
    pub name: String,
    pub stage: Stage,
    pub cli_config: ClaudeCliConfig,
}

impl ClaudeCollaborator {
    pub fn new(stage: Stage, model: String, timeout: Duration) -> Self {
        Self {
            name: format!("claude_{stage}"),
            stage,
            cli_config: ClaudeCliConfig::new(model, timeout),
        }
    }
}

#[async_trait]
impl DecisionCollaborator for ClaudeCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, request: &StageRequest) -> Result<serde_json::Value, CollaboratorError> {
        if request.stage != self.stage {
            return Err(CollaboratorError::Misrouted {
                expected: self.stage,
                got: request.stage,
            });
        }

        let user_prompt = serde_json::to_string_pretty(request)?;
        let raw_output = invoke_claude(&system_prompt(self.stage), &user_prompt, &self.cli_config).await?;
        extract_object(&raw_output)
    }
}
