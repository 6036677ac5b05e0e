//! The pipeline: step table, orchestrator and metrics sinks.

mod metrics;
mod orchestrator;
mod step;

pub use metrics::{MetricsRecorder, MetricsSink, PipelineMetric, ToolMetric, TracingMetrics};
pub use orchestrator::{Orchestrator, OrchestratorConfig, StatusMismatchPolicy};
pub use step::{PipelineStep, StepTable};
