//! JSONL-backed artifact store with in-memory caching.
//!
//! All artifacts live in a single `artifacts.jsonl` file. Creates append a
//! line; updates rewrite the whole file from the cache.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use super::traits::{ArtifactStore, Filter};
use crate::domain::{Artifact, ArtifactField, ArtifactFields, ArtifactUpdate};
use crate::error::{PipelineError, Result};

const ARTIFACTS_FILE: &str = "artifacts.jsonl";

/// JSONL file store for artifacts.
pub struct JsonlArtifactStore {
    path: PathBuf,
    cache: RwLock<Option<Vec<Artifact>>>,
}

impl JsonlArtifactStore {
    /// Open (or create) a store in the given directory.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref();
        fs::create_dir_all(base_path)?;
        Ok(Self {
            path: base_path.join(ARTIFACTS_FILE),
            cache: RwLock::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file into the cache if not already loaded.
    fn ensure_loaded(&self) -> Result<()> {
        {
            let cache = self.cache.read().map_err(|e| PipelineError::Storage(e.to_string()))?;
            if cache.is_some() {
                return Ok(());
            }
        }

        let mut cache = self.cache.write().map_err(|e| PipelineError::Storage(e.to_string()))?;
        if cache.is_some() {
            return Ok(());
        }

        let mut artifacts = Vec::new();
        if self.path.exists() {
            let reader = BufReader::new(File::open(&self.path)?);
            for line in reader.lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    artifacts.push(serde_json::from_str(&line)?);
                }
            }
        }

        *cache = Some(artifacts);
        Ok(())
    }

    fn rewrite_file(&self, artifacts: &[Artifact]) -> Result<()> {
        let mut file = File::create(&self.path)?;
        for artifact in artifacts {
            writeln!(file, "{}", serde_json::to_string(artifact)?)?;
        }
        Ok(())
    }

    /// Persist a new artifact.
    pub fn create(&self, artifact: &Artifact) -> Result<()> {
        self.ensure_loaded()?;

        let mut cache = self.cache.write().map_err(|e| PipelineError::Storage(e.to_string()))?;
        let artifacts = cache
            .as_mut()
            .ok_or_else(|| PipelineError::Storage("artifact cache not loaded".to_string()))?;

        if artifacts.iter().any(|a| a.id == artifact.id) {
            return Err(PipelineError::Storage(format!("Artifact already exists: {}", artifact.id)));
        }

        // Append to file first (source of truth)
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(artifact)?)?;

        artifacts.push(artifact.clone());
        Ok(())
    }

    /// Full artifact record by id.
    pub fn find(&self, id: &str) -> Result<Option<Artifact>> {
        self.ensure_loaded()?;
        let cache = self.cache.read().map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(cache.as_ref().and_then(|all| all.iter().find(|a| a.id == id).cloned()))
    }

    /// All artifacts matching every filter, in creation order.
    pub fn list(&self, filters: &[Filter]) -> Result<Vec<Artifact>> {
        self.ensure_loaded()?;
        let cache = self.cache.read().map_err(|e| PipelineError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        for artifact in cache.iter().flatten() {
            let value = serde_json::to_value(artifact)?;
            if filters.iter().all(|f| f.matches(&value)) {
                results.push(artifact.clone());
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl ArtifactStore for JsonlArtifactStore {
    async fn get(&self, id: &str, fields: &[ArtifactField]) -> Result<Option<ArtifactFields>> {
        Ok(self.find(id)?.map(|a| a.select(fields)))
    }

    async fn update(&self, id: &str, update: ArtifactUpdate) -> Result<()> {
        self.ensure_loaded()?;

        let mut cache = self.cache.write().map_err(|e| PipelineError::Storage(e.to_string()))?;
        let artifacts = cache
            .as_mut()
            .ok_or_else(|| PipelineError::Storage("artifact cache not loaded".to_string()))?;

        let index = artifacts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| PipelineError::ArtifactNotFound(id.to_string()))?;

        // Cache only changes once the file does
        let mut updated = artifacts.clone();
        updated[index].apply(&update);
        self.rewrite_file(&updated)?;

        *artifacts = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactStatus, ArtifactType};
    use tempfile::TempDir;

    fn create_test_store() -> (JsonlArtifactStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlArtifactStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_and_get_fields() {
        let (store, _temp) = create_test_store();
        let artifact = Artifact::new("Release notes", ArtifactType::Blog).with_id("a1");
        store.create(&artifact).unwrap();

        let fields = store
            .get("a1", &[ArtifactField::Title, ArtifactField::Status])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fields.title.as_deref(), Some("Release notes"));
        assert_eq!(fields.status, Some(ArtifactStatus::Draft));
        assert!(fields.content.is_none());
    }

    #[test]
    fn test_duplicate_create_rejected() {
        let (store, _temp) = create_test_store();
        let artifact = Artifact::new("t", ArtifactType::Blog).with_id("a1");
        store.create(&artifact).unwrap();
        assert!(store.create(&artifact).is_err());
    }

    #[tokio::test]
    async fn test_update_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = JsonlArtifactStore::new(temp_dir.path()).unwrap();
            store
                .create(&Artifact::new("t", ArtifactType::Showcase).with_id("a1"))
                .unwrap();
            store
                .update("a1", ArtifactUpdate::status(ArtifactStatus::FoundationsApproval))
                .await
                .unwrap();
        }

        {
            let store = JsonlArtifactStore::new(temp_dir.path()).unwrap();
            let artifact = store.find("a1").unwrap().unwrap();
            assert_eq!(artifact.status, ArtifactStatus::FoundationsApproval);
        }
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let (store, _temp) = create_test_store();
        let err = store
            .update("missing", ArtifactUpdate::status(ArtifactStatus::Ready))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_list_with_filters() {
        let (store, _temp) = create_test_store();
        store
            .create(&Artifact::new("Rust tips", ArtifactType::Blog).with_id("a1"))
            .unwrap();
        store
            .create(
                &Artifact::new("Launch", ArtifactType::SocialPost)
                    .with_id("a2")
                    .with_status(ArtifactStatus::Ready),
            )
            .unwrap();
        store
            .create(&Artifact::new("More rust", ArtifactType::Blog).with_id("a3"))
            .unwrap();

        let drafts = store.list(&[Filter::eq("status", ArtifactStatus::Draft)]).unwrap();
        assert_eq!(drafts.len(), 2);

        let rusty = store
            .list(&[Filter::contains("title", "rust"), Filter::ne("id", "a1")])
            .unwrap();
        assert_eq!(rusty.len(), 1);
        assert_eq!(rusty[0].id, "a3");
    }

    #[tokio::test]
    async fn test_failed_rewrite_leaves_cache_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("store");
        let store = JsonlArtifactStore::new(&base).unwrap();
        store.create(&Artifact::new("t", ArtifactType::Blog).with_id("a1")).unwrap();

        // Replacing the file with a directory makes the rewrite fail
        fs::remove_file(store.path()).unwrap();
        fs::create_dir(store.path()).unwrap();

        let result = store
            .update("a1", ArtifactUpdate::status(ArtifactStatus::Research))
            .await;

        assert!(result.is_err());
        assert_eq!(store.find("a1").unwrap().unwrap().status, ArtifactStatus::Draft);
    }

    #[test]
    fn test_empty_store() {
        let (store, _temp) = create_test_store();
        assert!(store.list(&[]).unwrap().is_empty());
        assert!(store.find("a1").unwrap().is_none());
    }
}
