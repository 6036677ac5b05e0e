//! Checkpoint storage.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Checkpoint;
use crate::error::{PipelineError, Result};

/// Keyed checkpoint history, addressed by artifact id.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Append a checkpoint to the artifact's history.
    async fn record(&self, checkpoint: Checkpoint) -> Result<()>;

    /// Most recent checkpoint for the artifact.
    async fn last(&self, artifact_id: &str) -> Result<Option<Checkpoint>>;

    /// Drop all history for the artifact.
    async fn clear(&self, artifact_id: &str) -> Result<()>;

    /// Full history, oldest first.
    async fn history(&self, artifact_id: &str) -> Result<Vec<Checkpoint>>;
}

/// Process-lifetime checkpoint store.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    checkpoints: Mutex<HashMap<String, Vec<Checkpoint>>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn record(&self, checkpoint: Checkpoint) -> Result<()> {
        self.checkpoints
            .lock()
            .map_err(|e| PipelineError::Checkpoint(e.to_string()))?
            .entry(checkpoint.artifact_id.clone())
            .or_default()
            .push(checkpoint);
        Ok(())
    }

    async fn last(&self, artifact_id: &str) -> Result<Option<Checkpoint>> {
        let checkpoints = self
            .checkpoints
            .lock()
            .map_err(|e| PipelineError::Checkpoint(e.to_string()))?;
        Ok(checkpoints.get(artifact_id).and_then(|h| h.last().cloned()))
    }

    async fn clear(&self, artifact_id: &str) -> Result<()> {
        self.checkpoints
            .lock()
            .map_err(|e| PipelineError::Checkpoint(e.to_string()))?
            .remove(artifact_id);
        Ok(())
    }

    async fn history(&self, artifact_id: &str) -> Result<Vec<Checkpoint>> {
        let checkpoints = self
            .checkpoints
            .lock()
            .map_err(|e| PipelineError::Checkpoint(e.to_string()))?;
        Ok(checkpoints.get(artifact_id).cloned().unwrap_or_default())
    }
}
