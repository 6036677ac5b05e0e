//! Error types for the artifact pipeline
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::domain::ErrorCategory;

/// All error types that can occur while driving an artifact pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Artifact not found in the store
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Artifact is in a status the operation does not accept
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// A tool unit failed at the transport level
    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    /// Tool name does not resolve to a registered step
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Step table is malformed
    #[error("Invalid step table: {0}")]
    InvalidStepTable(String),

    /// Artifact store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Checkpoint create/rollback error
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Category reported in a `PipelineResult` when this error ends a step.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::ArtifactNotFound(_) => ErrorCategory::ArtifactNotFound,
            PipelineError::InvalidStatus(_) => ErrorCategory::InvalidStatus,
            _ => ErrorCategory::ToolExecutionFailed,
        }
    }

    /// Whether retrying the same stage later can reasonably succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PipelineError::ArtifactNotFound(_)
                | PipelineError::UnknownTool(_)
                | PipelineError::InvalidStepTable(_)
                | PipelineError::Checkpoint(_)
                | PipelineError::Config(_)
        )
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_not_found_error() {
        let err = PipelineError::ArtifactNotFound("art-1".to_string());
        assert_eq!(err.to_string(), "Artifact not found: art-1");
        assert_eq!(err.category(), ErrorCategory::ArtifactNotFound);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_status_error() {
        let err = PipelineError::InvalidStatus("draft".to_string());
        assert_eq!(err.to_string(), "Invalid status: draft");
        assert_eq!(err.category(), ErrorCategory::InvalidStatus);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_tool_error_is_recoverable() {
        let err = PipelineError::ToolExecutionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "Tool execution failed: timeout");
        assert_eq!(err.category(), ErrorCategory::ToolExecutionFailed);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_storage_error_maps_to_tool_failure() {
        let err = PipelineError::Storage("file locked".to_string());
        assert_eq!(err.category(), ErrorCategory::ToolExecutionFailed);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_non_recoverable_kinds() {
        assert!(!PipelineError::UnknownTool("x".into()).is_recoverable());
        assert!(!PipelineError::InvalidStepTable("x".into()).is_recoverable());
        assert!(!PipelineError::Checkpoint("x".into()).is_recoverable());
        assert!(!PipelineError::Config("x".into()).is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: PipelineError = json_err.into();
        assert!(matches!(err, PipelineError::Json(_)));
    }
}
