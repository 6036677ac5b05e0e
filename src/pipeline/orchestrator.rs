//! Pipeline orchestrator - drives one artifact through the step table.
//!
//! Each step runs as:
//! 1. Progress event to the registered callback
//! 2. Checkpoint of the artifact's current status
//! 3. Tool invocation through the backoff executor
//! 4. Status commit on success
//! 5. Metrics and outcome recording
//!
//! A failed required step aborts the run and rolls the artifact back to the
//! checkpoint taken just before it. A failed optional step is logged and
//! skipped. A pause step ends the run early with `paused_for_approval` set,
//! and `resume_from_approval` picks up right after it.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::metrics::{MetricsSink, TracingMetrics};
use super::step::{PipelineStep, StepTable};
use crate::backoff::{BackoffExecutor, BackoffPolicy};
use crate::checkpoint::{CheckpointManager, CheckpointStore, MemoryCheckpointStore};
use crate::domain::{
    ArtifactField, ArtifactStatus, ArtifactUpdate, ErrorCategory, PipelineFailure, PipelineProgress, PipelineResult,
    ProgressCallback, RunKind, StepOutcome, ToolOutcome,
};
use crate::error::{PipelineError, Result};
use crate::id::generate_trace_id;
use crate::storage::ArtifactStore;
use crate::tools::{ToolContext, ToolKind, ToolRegistry};

/// What to do when a tool reports a transition the step table disagrees with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMismatchPolicy {
    /// Log and commit the table's status anyway
    #[default]
    Warn,
    /// Treat the step as failed with `STATUS_MISMATCH`
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub backoff: BackoffPolicy,
    pub status_mismatch: StatusMismatchPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// Honor required flags and pause steps
    Pipeline,
    /// One step, always required, never pauses
    SingleTool,
}

/// Per-run accumulator
#[derive(Debug, Default)]
struct RunState {
    tool_results: Vec<StepOutcome>,
    completed: Vec<String>,
}

/// Drives artifacts through a [`StepTable`].
///
/// One orchestrator can run many artifacts concurrently. Runs on the same
/// artifact id are not excluded from each other; callers serialize those.
pub struct Orchestrator {
    steps: StepTable,
    tools: ToolRegistry,
    store: Arc<dyn ArtifactStore>,
    checkpoints: CheckpointManager,
    backoff: BackoffExecutor,
    metrics: Arc<dyn MetricsSink>,
    progress: Option<ProgressCallback>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator. Every step's tool must be registered.
    pub fn new(steps: StepTable, tools: ToolRegistry, store: Arc<dyn ArtifactStore>) -> Result<Self> {
        let unregistered: Vec<&str> = steps
            .steps()
            .iter()
            .filter(|s| !tools.contains(s.tool))
            .map(|s| s.name())
            .collect();
        if !unregistered.is_empty() {
            return Err(PipelineError::InvalidStepTable(format!(
                "no tool unit registered for: {}",
                unregistered.join(", ")
            )));
        }

        let checkpoints = CheckpointManager::new(store.clone(), Arc::new(MemoryCheckpointStore::new()));
        Ok(Self {
            steps,
            tools,
            store,
            checkpoints,
            backoff: BackoffExecutor::default(),
            metrics: Arc::new(TracingMetrics),
            progress: None,
            config: OrchestratorConfig::default(),
        })
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.backoff = BackoffExecutor::new(config.backoff.clone());
        self.config = config;
        self
    }

    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = CheckpointManager::new(self.store.clone(), store);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn steps(&self) -> &StepTable {
        &self.steps
    }

    pub fn checkpoints(&self) -> &CheckpointManager {
        &self.checkpoints
    }

    /// Run the whole table from the first step.
    pub async fn execute(&self, artifact_id: &str) -> PipelineResult {
        let trace_id = generate_trace_id(RunKind::Pipeline);
        info!(artifact_id, trace_id = %trace_id, total_steps = self.steps.len(), "Starting pipeline");

        if let Err(e) = self.checkpoints.clear_checkpoints(artifact_id).await {
            warn!(artifact_id, error = %e, "Failed to clear previous checkpoints");
        }

        let plan: Vec<(usize, &PipelineStep)> = self.steps.steps().iter().enumerate().collect();
        self.run(artifact_id, &trace_id, &plan, RunMode::Pipeline).await
    }

    /// Continue a paused run with the steps after the pause step.
    ///
    /// The artifact must be in an approval-eligible status. Any other status
    /// is rejected without touching the store or the checkpoints.
    pub async fn resume_from_approval(&self, artifact_id: &str) -> PipelineResult {
        let trace_id = generate_trace_id(RunKind::Resume);

        let status = match self.store.get(artifact_id, &[ArtifactField::Status]).await {
            Ok(Some(fields)) => fields.status,
            Ok(None) => {
                return self.reject(artifact_id, &trace_id, PipelineError::ArtifactNotFound(artifact_id.to_string()));
            }
            Err(e) => return self.reject(artifact_id, &trace_id, e),
        };

        let Some(status) = status.filter(ArtifactStatus::is_approval_eligible) else {
            let current = status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string());
            let eligible: Vec<&str> = ArtifactStatus::APPROVAL_ELIGIBLE.iter().map(|s| s.as_str()).collect();
            let message = format!(
                "artifact {} is in status {}, resume requires one of: {}",
                artifact_id,
                current,
                eligible.join(", ")
            );
            return self.reject(artifact_id, &trace_id, PipelineError::InvalidStatus(message));
        };

        let Some(resume_at) = self.steps.resume_index() else {
            return self.reject(
                artifact_id,
                &trace_id,
                PipelineError::InvalidStepTable("step table has no approval step to resume from".to_string()),
            );
        };

        info!(
            artifact_id,
            trace_id = %trace_id,
            status = %status,
            resume_at,
            "Resuming pipeline after approval"
        );

        let plan: Vec<(usize, &PipelineStep)> = self.steps.steps().iter().enumerate().skip(resume_at).collect();
        self.run(artifact_id, &trace_id, &plan, RunMode::Pipeline).await
    }

    /// Run one step by tool name.
    pub async fn execute_single_tool(&self, tool_name: &str, artifact_id: &str) -> PipelineResult {
        match tool_name.parse::<ToolKind>() {
            Ok(kind) => self.execute_tool(kind, artifact_id).await,
            Err(e) => {
                let trace_id = generate_trace_id(RunKind::SingleTool);
                warn!(artifact_id, tool = tool_name, "Unknown tool requested");
                let failure = PipelineFailure {
                    category: ErrorCategory::ToolExecutionFailed,
                    message: e.to_string(),
                    failed_step: None,
                    failed_tool: Some(tool_name.to_string()),
                    recoverable: false,
                };
                PipelineResult::rejected(artifact_id, trace_id, 1, failure)
            }
        }
    }

    /// Run the step table's step for `kind` on its own.
    pub async fn execute_tool(&self, kind: ToolKind, artifact_id: &str) -> PipelineResult {
        let trace_id = generate_trace_id(RunKind::SingleTool);

        let Some((index, step)) = self.steps.get(kind) else {
            let failure = PipelineFailure {
                category: ErrorCategory::ToolExecutionFailed,
                message: format!("tool {} is not part of the step table", kind),
                failed_step: None,
                failed_tool: Some(kind.name().to_string()),
                recoverable: false,
            };
            return PipelineResult::rejected(artifact_id, trace_id, 1, failure);
        };

        info!(artifact_id, trace_id = %trace_id, tool = step.name(), "Executing single tool");
        self.run(artifact_id, &trace_id, &[(index, step)], RunMode::SingleTool)
            .await
    }

    fn reject(&self, artifact_id: &str, trace_id: &str, err: PipelineError) -> PipelineResult {
        warn!(artifact_id, trace_id, error = %err, "Run rejected");
        let failure = PipelineFailure::precondition(err.category(), err.to_string(), err.is_recoverable());
        PipelineResult::rejected(artifact_id, trace_id, 0, failure)
    }

    async fn run(
        &self,
        artifact_id: &str,
        trace_id: &str,
        plan: &[(usize, &PipelineStep)],
        mode: RunMode,
    ) -> PipelineResult {
        let started = Instant::now();
        let total_steps = plan.len();
        let mut state = RunState::default();

        for (position, &(index, step)) in plan.iter().enumerate() {
            self.emit_progress(position, total_steps, &state.completed, step, trace_id);

            let metadata = json!({ "step": step.name(), "trace_id": trace_id });
            if let Err(e) = self.checkpoints.create_checkpoint(artifact_id, index, metadata).await {
                let failure = PipelineFailure {
                    category: e.category(),
                    message: format!("checkpoint before {} failed: {}", step.name(), e),
                    failed_step: Some(index),
                    failed_tool: Some(step.name().to_string()),
                    recoverable: e.is_recoverable(),
                };
                return self.abort(artifact_id, trace_id, started, total_steps, state, failure).await;
            }

            let outcome = self.run_step(step, artifact_id, trace_id).await;
            let required = step.required || mode == RunMode::SingleTool;

            if !outcome.success {
                let failure = PipelineFailure {
                    category: outcome.error_category(),
                    message: outcome.error_message(),
                    failed_step: Some(index),
                    failed_tool: Some(step.name().to_string()),
                    recoverable: outcome.is_recoverable(),
                };
                state.tool_results.push(StepOutcome {
                    step: step.name().to_string(),
                    outcome,
                });

                if !required {
                    warn!(
                        artifact_id,
                        trace_id,
                        step = step.name(),
                        error = %failure.message,
                        "Optional step failed, continuing"
                    );
                    continue;
                }
                return self.abort(artifact_id, trace_id, started, total_steps, state, failure).await;
            }

            state.tool_results.push(StepOutcome {
                step: step.name().to_string(),
                outcome,
            });
            state.completed.push(step.name().to_string());

            if step.pause_for_approval && mode == RunMode::Pipeline {
                // The approval status is committed, so there is nothing left to roll back to.
                if let Err(e) = self.checkpoints.clear_checkpoints(artifact_id).await {
                    warn!(artifact_id, error = %e, "Failed to clear checkpoints");
                }
                info!(artifact_id, trace_id, step = step.name(), "Pipeline paused for approval");
                return PipelineResult {
                    success: true,
                    artifact_id: artifact_id.to_string(),
                    trace_id: trace_id.to_string(),
                    duration_ms: elapsed_ms(started),
                    steps_completed: position + 1,
                    total_steps,
                    tool_results: state.tool_results,
                    paused_for_approval: true,
                    paused_at_step: Some(step.name().to_string()),
                    error: None,
                };
            }
        }

        let duration_ms = elapsed_ms(started);
        self.metrics.record_pipeline_execution(duration_ms, true);
        if let Err(e) = self.checkpoints.clear_checkpoints(artifact_id).await {
            warn!(artifact_id, error = %e, "Failed to clear checkpoints");
        }

        info!(artifact_id, trace_id, duration_ms, total_steps, "Pipeline completed");
        PipelineResult {
            success: true,
            artifact_id: artifact_id.to_string(),
            trace_id: trace_id.to_string(),
            duration_ms,
            steps_completed: total_steps,
            total_steps,
            tool_results: state.tool_results,
            paused_for_approval: false,
            paused_at_step: None,
            error: None,
        }
    }

    /// Invoke one step and turn whatever happens into a [`ToolOutcome`].
    async fn run_step(&self, step: &PipelineStep, artifact_id: &str, trace_id: &str) -> ToolOutcome {
        let started = Instant::now();

        let outcome = match self
            .backoff
            .run_with(step.backoff.as_ref(), step.name(), move || {
                self.invoke(step, artifact_id, trace_id)
            })
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => ToolOutcome::failure(ErrorCategory::ToolExecutionFailed, e.to_string(), e.is_recoverable()),
        };

        let outcome = self.reconcile(step, outcome);
        let outcome = if outcome.success {
            self.commit_status(step, artifact_id, outcome).await
        } else {
            outcome
        };

        let duration_ms = elapsed_ms(started);
        let outcome = if outcome.duration_ms == 0 {
            outcome.with_duration_ms(duration_ms)
        } else {
            outcome
        };
        self.metrics.record_tool_execution(step.name(), duration_ms, outcome.success);

        debug!(
            artifact_id,
            trace_id,
            step = step.name(),
            duration_ms,
            success = outcome.success,
            "Step finished"
        );
        outcome
    }

    async fn invoke(&self, step: &PipelineStep, artifact_id: &str, trace_id: &str) -> Result<ToolOutcome> {
        let Some(params) = self.store.get(artifact_id, &step.fields).await? else {
            return Ok(ToolOutcome::failure(
                ErrorCategory::ArtifactNotFound,
                format!("artifact {} not found", artifact_id),
                false,
            ));
        };

        let Some(unit) = self.tools.get(step.tool) else {
            return Ok(ToolOutcome::failure(
                ErrorCategory::ToolExecutionFailed,
                format!("no tool unit registered for {}", step.tool),
                false,
            ));
        };

        let ctx = ToolContext {
            artifact_id: artifact_id.to_string(),
            trace_id: trace_id.to_string(),
            tool: step.tool,
        };
        unit.execute(params, &ctx).await
    }

    /// Compare a reported transition with the step table.
    fn reconcile(&self, step: &PipelineStep, outcome: ToolOutcome) -> ToolOutcome {
        let Some(transition) = outcome.status_transition else {
            return outcome;
        };
        if !outcome.success || transition.to == step.status_after {
            return outcome;
        }

        match self.config.status_mismatch {
            StatusMismatchPolicy::Warn => {
                warn!(
                    step = step.name(),
                    reported = %transition.to,
                    expected = %step.status_after,
                    "Tool reported unexpected status transition"
                );
                outcome
            }
            StatusMismatchPolicy::Fail => {
                let message = format!(
                    "{} reported transition to {}, expected {}",
                    step.name(),
                    transition.to,
                    step.status_after
                );
                outcome.into_failure(ErrorCategory::StatusMismatch, message, true)
            }
        }
    }

    async fn commit_status(&self, step: &PipelineStep, artifact_id: &str, outcome: ToolOutcome) -> ToolOutcome {
        let target = step.committed_status();
        match self.store.update(artifact_id, ArtifactUpdate::status(target)).await {
            Ok(()) => {
                info!(
                    artifact_id,
                    step = step.name(),
                    from = %step.status_before,
                    to = %target,
                    "Artifact status committed"
                );
                outcome
            }
            Err(e) => {
                let message = format!("failed to persist status {}: {}", target, e);
                let recoverable = e.is_recoverable();
                outcome.into_failure(e.category(), message, recoverable)
            }
        }
    }

    async fn abort(
        &self,
        artifact_id: &str,
        trace_id: &str,
        started: Instant,
        total_steps: usize,
        state: RunState,
        failure: PipelineFailure,
    ) -> PipelineResult {
        let duration_ms = elapsed_ms(started);
        self.metrics.record_pipeline_execution(duration_ms, false);

        error!(
            artifact_id,
            trace_id,
            step = failure.failed_tool.as_deref().unwrap_or("-"),
            category = %failure.category,
            error = %failure.message,
            "Required step failed, aborting pipeline"
        );

        match self.checkpoints.rollback(artifact_id).await {
            Ok(Some(status)) => info!(artifact_id, status = %status, "Artifact rolled back"),
            Ok(None) => {}
            Err(e) => error!(artifact_id, error = %e, "Rollback failed"),
        }

        PipelineResult {
            success: false,
            artifact_id: artifact_id.to_string(),
            trace_id: trace_id.to_string(),
            duration_ms,
            steps_completed: state.completed.len(),
            total_steps,
            tool_results: state.tool_results,
            paused_for_approval: false,
            paused_at_step: None,
            error: Some(failure),
        }
    }

    fn emit_progress(
        &self,
        position: usize,
        total_steps: usize,
        completed: &[String],
        step: &PipelineStep,
        trace_id: &str,
    ) {
        debug!(trace_id, step = step.name(), position, total_steps, "Starting step");
        if let Some(callback) = &self.progress {
            callback(&PipelineProgress {
                current_step: position,
                total_steps,
                completed_tools: completed.to_vec(),
                current_tool: step.name().to_string(),
                trace_id: trace_id.to_string(),
            });
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Artifact, ArtifactFields, ArtifactType};
    use crate::pipeline::MetricsRecorder;
    use crate::storage::MemoryArtifactStore;
    use crate::tools::ToolUnit;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Succeeds after failing at the transport level `failures` times.
    struct FlakyTool {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyTool {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ToolUnit for FlakyTool {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn execute(&self, params: ArtifactFields, _ctx: &ToolContext) -> Result<ToolOutcome> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(PipelineError::ToolExecutionFailed("connection reset".to_string()));
            }
            Ok(ToolOutcome::success(json!({ "title": params.title })))
        }
    }

    fn two_step_table() -> StepTable {
        StepTable::new(vec![
            PipelineStep::new(ToolKind::Research, ArtifactStatus::Draft, ArtifactStatus::Research),
            PipelineStep::new(
                ToolKind::FoundationsAnalysis,
                ArtifactStatus::Research,
                ArtifactStatus::Foundations,
            ),
        ])
        .unwrap()
    }

    fn store_with_draft() -> Arc<MemoryArtifactStore> {
        let store = Arc::new(MemoryArtifactStore::new());
        store
            .insert(Artifact::new("Edge caching", ArtifactType::Blog).with_id("a1"))
            .unwrap();
        store
    }

    fn orchestrator(store: Arc<MemoryArtifactStore>, research: Arc<FlakyTool>, foundations: Arc<FlakyTool>) -> Orchestrator {
        let tools = ToolRegistry::new()
            .with(ToolKind::Research, research)
            .with(ToolKind::FoundationsAnalysis, foundations);
        Orchestrator::new(two_step_table(), tools, store)
            .unwrap()
            .with_config(OrchestratorConfig {
                backoff: BackoffPolicy::immediate(2),
                ..Default::default()
            })
    }

    #[test]
    fn test_new_rejects_unregistered_tools() {
        let tools = ToolRegistry::new().with(ToolKind::Research, FlakyTool::new(0));
        let err = Orchestrator::new(two_step_table(), tools, store_with_draft())
            .err()
            .unwrap();
        assert!(err.to_string().contains("foundations-analysis"));
    }

    #[tokio::test]
    async fn test_transport_errors_within_budget_are_retried() {
        let store = store_with_draft();
        let research = FlakyTool::new(2);
        let orch = orchestrator(store.clone(), research.clone(), FlakyTool::new(0));

        let result = orch.execute("a1").await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(research.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.steps_completed, 2);
        assert_eq!(store.status("a1"), Some(ArtifactStatus::Foundations));
        assert_eq!(result.tool_result("research").unwrap().payload["title"], "Edge caching");
    }

    #[tokio::test]
    async fn test_exhausted_retries_roll_back() {
        let store = store_with_draft();
        let orch = orchestrator(store.clone(), FlakyTool::new(0), FlakyTool::new(10));

        let result = orch.execute("a1").await;

        assert!(!result.success);
        let error = result.error.as_ref().unwrap();
        assert_eq!(error.failed_step, Some(1));
        assert_eq!(error.failed_tool.as_deref(), Some("foundations-analysis"));
        assert_eq!(error.category, ErrorCategory::ToolExecutionFailed);
        assert!(error.message.contains("connection reset"));
        assert_eq!(result.steps_completed, 1);
        assert_eq!(result.attempted_steps(), vec!["research", "foundations-analysis"]);
        assert_eq!(store.status("a1"), Some(ArtifactStatus::Research));
    }

    #[tokio::test]
    async fn test_step_override_limits_retries() {
        let store = store_with_draft();
        let research = FlakyTool::new(1);
        let table = StepTable::new(vec![
            PipelineStep::new(ToolKind::Research, ArtifactStatus::Draft, ArtifactStatus::Research).with_backoff(
                crate::backoff::BackoffOverride {
                    max_retries: Some(0),
                    ..Default::default()
                },
            ),
        ])
        .unwrap();
        let tools = ToolRegistry::new().with(ToolKind::Research, research.clone());
        let orch = Orchestrator::new(table, tools, store.clone())
            .unwrap()
            .with_config(OrchestratorConfig {
                backoff: BackoffPolicy::immediate(5),
                ..Default::default()
            });

        let result = orch.execute("a1").await;

        assert!(!result.success);
        assert_eq!(research.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.status("a1"), Some(ArtifactStatus::Draft));
    }

    #[tokio::test]
    async fn test_missing_artifact_fails_at_checkpoint() {
        let store = Arc::new(MemoryArtifactStore::new());
        let research = FlakyTool::new(0);
        let orch = orchestrator(store, research.clone(), FlakyTool::new(0));

        let result = orch.execute("ghost").await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert_eq!(error.category, ErrorCategory::ArtifactNotFound);
        assert!(!error.recoverable);
        assert_eq!(error.failed_step, Some(0));
        assert_eq!(research.calls.load(Ordering::SeqCst), 0);
        assert!(result.tool_results.is_empty());
    }

    #[tokio::test]
    async fn test_metrics_recorded_per_step_and_run() {
        let store = store_with_draft();
        let metrics = Arc::new(MetricsRecorder::new());
        let orch = orchestrator(store, FlakyTool::new(0), FlakyTool::new(0)).with_metrics(metrics.clone());

        let result = orch.execute("a1").await;

        assert!(result.success);
        let tools: Vec<_> = metrics.tool_executions().into_iter().map(|m| m.tool).collect();
        assert_eq!(tools, vec!["research", "foundations-analysis"]);
        assert_eq!(metrics.pipeline_executions().len(), 1);
        assert!(metrics.pipeline_executions()[0].success);
    }

    #[tokio::test]
    async fn test_resume_without_pause_step_is_rejected() {
        let store = Arc::new(MemoryArtifactStore::new());
        store
            .insert(
                Artifact::new("t", ArtifactType::Blog)
                    .with_id("a1")
                    .with_status(ArtifactStatus::FoundationsApproval),
            )
            .unwrap();
        let orch = orchestrator(store.clone(), FlakyTool::new(0), FlakyTool::new(0));

        let result = orch.resume_from_approval("a1").await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert_eq!(error.category, ErrorCategory::ToolExecutionFailed);
        assert!(!error.recoverable);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_single_tool() {
        let store = store_with_draft();
        let orch = orchestrator(store.clone(), FlakyTool::new(0), FlakyTool::new(0));

        let result = orch.execute_single_tool("translate", "a1").await;

        assert!(!result.success);
        assert_eq!(result.total_steps, 1);
        assert!(result.trace_id.starts_with("single-tool-"));
        let error = result.error.unwrap();
        assert_eq!(error.category, ErrorCategory::ToolExecutionFailed);
        assert!(!error.recoverable);
        assert_eq!(store.read_count(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_tool_outside_table_is_rejected() {
        let store = store_with_draft();
        let orch = orchestrator(store.clone(), FlakyTool::new(0), FlakyTool::new(0));

        let result = orch.execute_tool(ToolKind::Humanize, "a1").await;

        assert!(!result.success);
        assert_eq!(result.error.unwrap().failed_tool.as_deref(), Some("humanize"));
        assert_eq!(store.write_count(), 0);
    }
}
