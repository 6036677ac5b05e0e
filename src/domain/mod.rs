//! Domain types for the artifact pipeline
//!
//! This module contains all core domain types:
//! - Artifact: the content record, its status machine and field projections
//! - ToolOutcome: uniform result envelope of a tool invocation
//! - PipelineResult: what a run hands back to its caller
//! - PipelineProgress: snapshots emitted before each step

pub mod artifact;
pub mod outcome;
pub mod progress;
pub mod result;

pub use artifact::{Artifact, ArtifactField, ArtifactFields, ArtifactStatus, ArtifactType, ArtifactUpdate};
pub use outcome::{ErrorCategory, StatusTransition, ToolError, ToolOutcome};
pub use progress::{PipelineProgress, ProgressCallback};
pub use result::{PipelineFailure, PipelineResult, RunKind, StepOutcome};
