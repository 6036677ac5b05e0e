//! Progress reporting for in-flight runs.

use std::sync::Arc;

use serde::Serialize;

/// Snapshot emitted before each step executes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineProgress {
    /// Run-local position of the step about to execute (0-based)
    pub current_step: usize,
    pub total_steps: usize,
    /// Steps that have succeeded so far in this run
    pub completed_tools: Vec<String>,
    pub current_tool: String,
    pub trace_id: String,
}

impl PipelineProgress {
    /// Fraction of the run finished before the current step, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total_steps == 0 {
            return 1.0;
        }
        self.current_step as f64 / self.total_steps as f64
    }
}

/// Callback invoked synchronously with each progress snapshot.
pub type ProgressCallback = Arc<dyn Fn(&PipelineProgress) + Send + Sync>;
