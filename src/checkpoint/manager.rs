//! Single-level rollback of artifact status.

use std::sync::Arc;

use chrono::Utc;

use super::{Checkpoint, CheckpointStore};
use crate::domain::{ArtifactField, ArtifactStatus, ArtifactUpdate};
use crate::error::{PipelineError, Result};
use crate::storage::ArtifactStore;

/// Takes checkpoints from the artifact store and writes them back on rollback.
#[derive(Clone)]
pub struct CheckpointManager {
    artifacts: Arc<dyn ArtifactStore>,
    store: Arc<dyn CheckpointStore>,
}

impl CheckpointManager {
    pub fn new(artifacts: Arc<dyn ArtifactStore>, store: Arc<dyn CheckpointStore>) -> Self {
        Self { artifacts, store }
    }

    /// Snapshot the artifact's current status in the store.
    ///
    /// The status is read fresh rather than taken from the step table, so a
    /// previous run that left the artifact somewhere unexpected is captured
    /// as it really is.
    pub async fn create_checkpoint(
        &self,
        artifact_id: &str,
        step_index: usize,
        metadata: serde_json::Value,
    ) -> Result<Checkpoint> {
        let fields = self
            .artifacts
            .get(artifact_id, &[ArtifactField::Status])
            .await
            .map_err(|e| PipelineError::Checkpoint(format!("cannot read artifact {}: {}", artifact_id, e)))?
            .ok_or_else(|| PipelineError::ArtifactNotFound(artifact_id.to_string()))?;

        let status = fields
            .status
            .ok_or_else(|| PipelineError::Checkpoint(format!("artifact {} has no status", artifact_id)))?;

        let checkpoint = Checkpoint {
            step_index,
            artifact_id: artifact_id.to_string(),
            status,
            timestamp: Utc::now(),
            metadata,
        };
        self.store.record(checkpoint.clone()).await?;

        tracing::debug!(artifact_id, step_index, status = %status, "Checkpoint created");
        Ok(checkpoint)
    }

    /// Write the last checkpoint's status back onto the artifact.
    ///
    /// Returns the restored status, or `None` when there was nothing to roll
    /// back to.
    pub async fn rollback(&self, artifact_id: &str) -> Result<Option<ArtifactStatus>> {
        let Some(checkpoint) = self.store.last(artifact_id).await? else {
            tracing::info!(artifact_id, "No checkpoint to roll back to");
            return Ok(None);
        };

        self.artifacts
            .update(artifact_id, ArtifactUpdate::status(checkpoint.status))
            .await
            .map_err(|e| {
                PipelineError::Checkpoint(format!(
                    "rollback of {} to {} failed: {}",
                    artifact_id, checkpoint.status, e
                ))
            })?;

        tracing::info!(
            artifact_id,
            step_index = checkpoint.step_index,
            status = %checkpoint.status,
            "Rolled back to checkpoint"
        );
        Ok(Some(checkpoint.status))
    }

    pub async fn clear_checkpoints(&self, artifact_id: &str) -> Result<()> {
        self.store.clear(artifact_id).await
    }

    pub async fn last_checkpoint(&self, artifact_id: &str) -> Result<Option<Checkpoint>> {
        self.store.last(artifact_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;
    use crate::domain::{Artifact, ArtifactType};
    use crate::storage::MemoryArtifactStore;
    use serde_json::json;

    fn setup() -> (Arc<MemoryArtifactStore>, CheckpointManager) {
        let artifacts = Arc::new(MemoryArtifactStore::new());
        artifacts
            .insert(
                Artifact::new("t", ArtifactType::Blog)
                    .with_id("a1")
                    .with_status(ArtifactStatus::Research),
            )
            .unwrap();
        let manager = CheckpointManager::new(artifacts.clone(), Arc::new(MemoryCheckpointStore::new()));
        (artifacts, manager)
    }

    #[tokio::test]
    async fn test_checkpoint_captures_actual_status() {
        let (_artifacts, manager) = setup();
        let checkpoint = manager
            .create_checkpoint("a1", 1, json!({"step": "foundations-analysis"}))
            .await
            .unwrap();

        assert_eq!(checkpoint.status, ArtifactStatus::Research);
        assert_eq!(checkpoint.step_index, 1);
        assert_eq!(checkpoint.metadata["step"], "foundations-analysis");
    }

    #[tokio::test]
    async fn test_checkpoint_missing_artifact_is_not_recoverable() {
        let (_artifacts, manager) = setup();
        let err = manager.create_checkpoint("missing", 0, json!({})).await.unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotFound(_)));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_rollback_restores_last_checkpoint() {
        let (artifacts, manager) = setup();
        manager.create_checkpoint("a1", 1, json!({})).await.unwrap();
        artifacts
            .update("a1", ArtifactUpdate::status(ArtifactStatus::Foundations))
            .await
            .unwrap();

        let restored = manager.rollback("a1").await.unwrap();

        assert_eq!(restored, Some(ArtifactStatus::Research));
        assert_eq!(artifacts.status("a1"), Some(ArtifactStatus::Research));
    }

    #[tokio::test]
    async fn test_rollback_without_checkpoint_is_noop() {
        let (artifacts, manager) = setup();
        assert_eq!(manager.rollback("a1").await.unwrap(), None);
        assert_eq!(artifacts.write_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_makes_rollback_noop() {
        let (artifacts, manager) = setup();
        manager.create_checkpoint("a1", 0, json!({})).await.unwrap();
        manager.clear_checkpoints("a1").await.unwrap();

        assert!(manager.last_checkpoint("a1").await.unwrap().is_none());
        assert_eq!(manager.rollback("a1").await.unwrap(), None);
        assert_eq!(artifacts.write_count(), 0);
    }
}
