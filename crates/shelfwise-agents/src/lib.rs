pub mod claude_cli;
pub mod collaborator;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod rules;

pub mod test_support;

pub use collaborator::{ClaudeCollaborator, DecisionCollaborator};
pub use error::{CollaboratorError, PipelineError, StageFault};
pub use orchestrator::{Collaborators, Optimization, Orchestrator, Outcome, RunFailure};
pub use rules::RuleBasedCollaborator;
