//! Metrics sinks for tool and pipeline executions.

use std::sync::Mutex;

use serde::Serialize;

/// Receives one record per tool invocation and one per finished run.
///
/// A paused run is not finished and records nothing here.
pub trait MetricsSink: Send + Sync {
    fn record_tool_execution(&self, tool: &str, duration_ms: u64, success: bool);

    fn record_pipeline_execution(&self, duration_ms: u64, success: bool);
}

/// Default sink: emits metrics as structured tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn record_tool_execution(&self, tool: &str, duration_ms: u64, success: bool) {
        tracing::info!(target: "metrics", tool, duration_ms, success, "tool_execution");
    }

    fn record_pipeline_execution(&self, duration_ms: u64, success: bool) {
        tracing::info!(target: "metrics", duration_ms, success, "pipeline_execution");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMetric {
    pub tool: String,
    pub duration_ms: u64,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineMetric {
    pub duration_ms: u64,
    pub success: bool,
}

#[derive(Debug, Default)]
struct Recorded {
    tools: Vec<ToolMetric>,
    pipelines: Vec<PipelineMetric>,
}

/// In-memory sink that keeps every record.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    inner: Mutex<Recorded>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool_executions(&self) -> Vec<ToolMetric> {
        self.inner.lock().map(|r| r.tools.clone()).unwrap_or_default()
    }

    pub fn pipeline_executions(&self) -> Vec<PipelineMetric> {
        self.inner.lock().map(|r| r.pipelines.clone()).unwrap_or_default()
    }
}

impl MetricsSink for MetricsRecorder {
    fn record_tool_execution(&self, tool: &str, duration_ms: u64, success: bool) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.tools.push(ToolMetric {
                tool: tool.to_string(),
                duration_ms,
                success,
            });
        }
    }

    fn record_pipeline_execution(&self, duration_ms: u64, success: bool) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.pipelines.push(PipelineMetric { duration_ms, success });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_keeps_order() {
        let recorder = MetricsRecorder::new();
        recorder.record_tool_execution("research", 12, true);
        recorder.record_tool_execution("skeleton", 30, false);
        recorder.record_tool_execution("research", 8, true);
        recorder.record_pipeline_execution(50, false);

        let tools: Vec<_> = recorder.tool_executions().into_iter().map(|m| m.tool).collect();
        assert_eq!(tools, vec!["research", "skeleton", "research"]);
        assert_eq!(recorder.tool_executions()[1].duration_ms, 30);
        assert!(!recorder.tool_executions()[1].success);
        assert_eq!(
            recorder.pipeline_executions(),
            vec![PipelineMetric {
                duration_ms: 50,
                success: false
            }]
        );
    }

    #[test]
    fn test_tracing_sink_is_silent_without_subscriber() {
        let sink = TracingMetrics;
        sink.record_tool_execution("write", 1, true);
        sink.record_pipeline_execution(1, true);
    }
}
