//! Tool unit backed by an external command.
//!
//! The command runs under `sh -c`, receives the resolved artifact fields as a
//! JSON object on stdin and must print a ToolOutcome JSON object on stdout.
//! Spawn failures, timeouts, non-zero exits and unparsable output are all
//! transport errors, so the backoff executor retries them.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{ToolContext, ToolKind, ToolUnit};
use crate::domain::{ArtifactFields, ToolOutcome};
use crate::error::{PipelineError, Result};

fn default_timeout_ms() -> u64 {
    300_000
}

/// Command line and limits for one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandToolConfig {
    pub command: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra environment variables
    #[serde(default)]
    pub env: Vec<(String, String)>,
}

impl CommandToolConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout_ms: default_timeout_ms(),
            env: Vec::new(),
        }
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Runs a shell command as a tool unit
pub struct CommandTool {
    kind: ToolKind,
    config: CommandToolConfig,
}

impl CommandTool {
    pub fn new(kind: ToolKind, config: CommandToolConfig) -> Self {
        Self { kind, config }
    }
}

#[async_trait]
impl ToolUnit for CommandTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    async fn execute(&self, params: ArtifactFields, ctx: &ToolContext) -> Result<ToolOutcome> {
        let started = Instant::now();
        let input = serde_json::to_vec(&params)?;

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.config.command)
            .env("ARTIFACT_ID", &ctx.artifact_id)
            .env("TRACE_ID", &ctx.trace_id)
            .env("PIPELINE_STEP", self.kind.name())
            .envs(self.config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PipelineError::ToolExecutionFailed(format!("{}: failed to spawn: {}", self.kind, e)))?;

        let stdin = child.stdin.take();
        let kind = self.kind;
        let run = async move {
            if let Some(mut stdin) = stdin {
                // A command that ignores its input may close stdin early.
                if let Err(e) = stdin.write_all(&input).await {
                    tracing::debug!(tool = kind.name(), error = %e, "Tool did not consume stdin");
                }
            }
            child.wait_with_output().await
        };

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let output = tokio::time::timeout(timeout, run).await.map_err(|_| {
            PipelineError::ToolExecutionFailed(format!("{}: timed out after {}ms", self.kind, self.config.timeout_ms))
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ToolExecutionFailed(format!(
                "{}: exited with {}: {}",
                self.kind,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let outcome: ToolOutcome = serde_json::from_str(stdout.trim()).map_err(|e| {
            PipelineError::ToolExecutionFailed(format!("{}: invalid outcome on stdout: {}", self.kind, e))
        })?;

        if outcome.duration_ms == 0 {
            return Ok(outcome.with_duration_ms(started.elapsed().as_millis() as u64));
        }
        Ok(outcome)
    }
}
