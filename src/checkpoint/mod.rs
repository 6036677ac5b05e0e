//! Checkpoints taken before each pipeline step.
//!
//! A checkpoint captures the artifact's status as it actually is in the store
//! right before a step runs, so a failed required step can put the artifact
//! back where it was. Only the most recent checkpoint per artifact is ever
//! read; one level of rollback is all the orchestrator needs.

mod manager;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ArtifactStatus;

pub use manager::CheckpointManager;
pub use store::{CheckpointStore, MemoryCheckpointStore};

/// Status snapshot of one artifact before one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Step table index the snapshot precedes
    pub step_index: usize,
    pub artifact_id: String,
    pub status: ArtifactStatus,
    pub timestamp: DateTime<Utc>,
    /// Step name, trace id and anything else useful when reading logs
    pub metadata: serde_json::Value,
}
