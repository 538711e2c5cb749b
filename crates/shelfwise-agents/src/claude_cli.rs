use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CollaboratorError;

/// Configuration for a Claude CLI invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    /// Executable to run; `claude` resolved from PATH by default.
    pub program: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            program: "claude".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClaudeCliConfig {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            timeout,
            ..Default::default()
        }
    }
}

/// Run the CLI in print mode and return its stdout.
///
/// The child is killed if this future is dropped, so a cancelled run does
/// not leave a model call running in the background.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, CollaboratorError> {
    debug!(program = %config.program, model = %config.model, "Invoking claude CLI");

    let output = tokio::time::timeout(
        config.timeout,
        Command::new(&config.program)
            .args([
                "-p",
                user_prompt,
                "--system-prompt",
                system_prompt,
                "--model",
                &config.model,
                "--output-format",
                "text",
            ])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| CollaboratorError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| CollaboratorError::Cli(format!("Failed to spawn {}: {e}", config.program)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, stderr = %stderr, "Claude CLI failed");
        return Err(CollaboratorError::Cli(format!(
            "{} exited {}: {}",
            config.program, output.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if stdout.trim().is_empty() {
        return Err(CollaboratorError::Cli("Claude returned empty response".to_string()));
    }

    Ok(stdout)
}

/// Check whether `program --version` runs successfully.
pub async fn check_cli_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
