//! Pipeline run results.
//!
//! A [`PipelineResult`] is built once per run and handed to the caller; the
//! orchestrator keeps no reference to it afterwards.

use serde::{Deserialize, Serialize};

use super::outcome::{ErrorCategory, ToolOutcome};

/// Kind of run, used as the trace id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunKind {
    Pipeline,
    Resume,
    SingleTool,
}

impl RunKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            RunKind::Pipeline => "pipeline",
            RunKind::Resume => "pipeline-resume",
            RunKind::SingleTool => "single-tool",
        }
    }
}

/// Outcome recorded under a step name, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    pub outcome: ToolOutcome,
}

/// Structured error of an aborted run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFailure {
    pub category: ErrorCategory,
    pub message: String,
    /// Step table index of the failing step
    pub failed_step: Option<usize>,
    pub failed_tool: Option<String>,
    pub recoverable: bool,
}

impl PipelineFailure {
    /// Failure raised before any step ran.
    pub fn precondition(category: ErrorCategory, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            category,
            message: message.into(),
            failed_step: None,
            failed_tool: None,
            recoverable,
        }
    }
}

/// Return value of `execute`, `resume_from_approval` and `execute_single_tool`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub success: bool,
    pub artifact_id: String,
    pub trace_id: String,
    pub duration_ms: u64,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub tool_results: Vec<StepOutcome>,
    pub paused_for_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PipelineFailure>,
}

impl PipelineResult {
    /// Failure result for a run that was rejected before doing any work.
    pub fn rejected(
        artifact_id: impl Into<String>,
        trace_id: impl Into<String>,
        total_steps: usize,
        failure: PipelineFailure,
    ) -> Self {
        Self {
            success: false,
            artifact_id: artifact_id.into(),
            trace_id: trace_id.into(),
            duration_ms: 0,
            steps_completed: 0,
            total_steps,
            tool_results: Vec::new(),
            paused_for_approval: false,
            paused_at_step: None,
            error: Some(failure),
        }
    }

    /// Outcome recorded for a step, if it was attempted.
    pub fn tool_result(&self, step: &str) -> Option<&ToolOutcome> {
        self.tool_results.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    /// Step names in the order they were attempted.
    pub fn attempted_steps(&self) -> Vec<&str> {
        self.tool_results.iter().map(|r| r.step.as_str()).collect()
    }

    pub fn error_category(&self) -> Option<&ErrorCategory> {
        self.error.as_ref().map(|e| &e.category)
    }
}
