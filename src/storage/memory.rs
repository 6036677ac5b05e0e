//! In-memory artifact store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::traits::ArtifactStore;
use crate::domain::{Artifact, ArtifactField, ArtifactFields, ArtifactStatus, ArtifactUpdate};
use crate::error::{PipelineError, Result};

/// HashMap-backed store that counts reads and writes.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<HashMap<String, Artifact>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an artifact. Not counted as a write.
    pub fn insert(&self, artifact: Artifact) -> Result<()> {
        self.artifacts
            .write()
            .map_err(|e| PipelineError::Storage(e.to_string()))?
            .insert(artifact.id.clone(), artifact);
        Ok(())
    }

    /// Full copy of a stored artifact.
    pub fn artifact(&self, id: &str) -> Option<Artifact> {
        self.artifacts.read().ok()?.get(id).cloned()
    }

    pub fn status(&self, id: &str) -> Option<ArtifactStatus> {
        self.artifact(id).map(|a| a.status)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn get(&self, id: &str, fields: &[ArtifactField]) -> Result<Option<ArtifactFields>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let artifacts = self.artifacts.read().map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(artifacts.get(id).map(|a| a.select(fields)))
    }

    async fn update(&self, id: &str, update: ArtifactUpdate) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut artifacts = self.artifacts.write().map_err(|e| PipelineError::Storage(e.to_string()))?;
        let artifact = artifacts
            .get_mut(id)
            .ok_or_else(|| PipelineError::ArtifactNotFound(id.to_string()))?;
        artifact.apply(&update);
        Ok(())
    }
}
