//! Tool outcome types.
//!
//! Every tool unit returns a [`ToolOutcome`]. A tool reporting `success: false`
//! is a semantic failure handled by the orchestrator's required/optional
//! branch; only a tool returning `Err` is retried.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::artifact::ArtifactStatus;

/// Error category carried by tool outcomes and pipeline results.
///
/// Tool-specific categories pass through unchanged as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCategory {
    ArtifactNotFound,
    InvalidStatus,
    ToolExecutionFailed,
    StatusMismatch,
    Other(String),
}

impl ErrorCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCategory::ArtifactNotFound => "ARTIFACT_NOT_FOUND",
            ErrorCategory::InvalidStatus => "INVALID_STATUS",
            ErrorCategory::ToolExecutionFailed => "TOOL_EXECUTION_FAILED",
            ErrorCategory::StatusMismatch => "STATUS_MISMATCH",
            ErrorCategory::Other(s) => s,
        }
    }
}

impl From<String> for ErrorCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ARTIFACT_NOT_FOUND" => ErrorCategory::ArtifactNotFound,
            "INVALID_STATUS" => ErrorCategory::InvalidStatus,
            "TOOL_EXECUTION_FAILED" => ErrorCategory::ToolExecutionFailed,
            "STATUS_MISMATCH" => ErrorCategory::StatusMismatch,
            _ => ErrorCategory::Other(s),
        }
    }
}

impl From<ErrorCategory> for String {
    fn from(category: ErrorCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status change a tool reports having observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: ArtifactStatus,
    pub to: ArtifactStatus,
}

fn default_recoverable() -> bool {
    true
}

/// Error descriptor attached to a failed outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(default = "default_recoverable")]
    pub recoverable: bool,
}

/// Uniform result envelope of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_transition: Option<StatusTransition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl ToolOutcome {
    pub fn success(payload: serde_json::Value) -> Self {
        Self {
            success: true,
            payload,
            status_transition: None,
            error: None,
            duration_ms: 0,
        }
    }

    pub fn failure(category: ErrorCategory, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            success: false,
            payload: serde_json::Value::Null,
            status_transition: None,
            error: Some(ToolError {
                category,
                message: message.into(),
                recoverable,
            }),
            duration_ms: 0,
        }
    }

    pub fn with_transition(mut self, from: ArtifactStatus, to: ArtifactStatus) -> Self {
        self.status_transition = Some(StatusTransition { from, to });
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Replace this outcome with a failure, keeping the payload and timing.
    pub fn into_failure(self, category: ErrorCategory, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            success: false,
            error: Some(ToolError {
                category,
                message: message.into(),
                recoverable,
            }),
            ..self
        }
    }

    /// Error category, defaulting to `TOOL_EXECUTION_FAILED` when absent.
    pub fn error_category(&self) -> ErrorCategory {
        self.error
            .as_ref()
            .map(|e| e.category.clone())
            .unwrap_or(ErrorCategory::ToolExecutionFailed)
    }

    /// Recoverable flag, defaulting to `true` when absent.
    pub fn is_recoverable(&self) -> bool {
        self.error.as_ref().map(|e| e.recoverable).unwrap_or(true)
    }

    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "tool reported failure without an error descriptor".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_defaults_without_descriptor() {
        let outcome = ToolOutcome {
            success: false,
            payload: json!(null),
            status_transition: None,
            error: None,
            duration_ms: 5,
        };
        assert_eq!(outcome.error_category(), ErrorCategory::ToolExecutionFailed);
        assert!(outcome.is_recoverable());
    }

    #[test]
    fn test_custom_category_passes_through() {
        let outcome: ToolOutcome = serde_json::from_value(json!({
            "success": false,
            "error": {"category": "RATE_LIMITED", "message": "slow down"}
        }))
        .unwrap();

        assert_eq!(outcome.error_category(), ErrorCategory::Other("RATE_LIMITED".into()));
        assert_eq!(outcome.error_category().to_string(), "RATE_LIMITED");
        assert!(outcome.is_recoverable());
        assert_eq!(outcome.error_message(), "slow down");
    }

    #[test]
    fn test_known_category_parses() {
        let category: ErrorCategory = "INVALID_STATUS".to_string().into();
        assert_eq!(category, ErrorCategory::InvalidStatus);
    }

    #[test]
    fn test_outcome_from_tool_json() {
        let outcome: ToolOutcome = serde_json::from_value(json!({
            "success": true,
            "payload": {"sources": 4},
            "status_transition": {"from": "draft", "to": "research"}
        }))
        .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.payload["sources"], 4);
        assert_eq!(
            outcome.status_transition,
            Some(StatusTransition {
                from: ArtifactStatus::Draft,
                to: ArtifactStatus::Research
            })
        );
        assert_eq!(outcome.duration_ms, 0);
    }

    #[test]
    fn test_into_failure_keeps_payload() {
        let outcome = ToolOutcome::success(json!({"words": 1200}))
            .with_duration_ms(40)
            .into_failure(ErrorCategory::StatusMismatch, "expected ready", true);

        assert!(!outcome.success);
        assert_eq!(outcome.payload["words"], 1200);
        assert_eq!(outcome.duration_ms, 40);
        assert_eq!(outcome.error_category(), ErrorCategory::StatusMismatch);
    }
}
