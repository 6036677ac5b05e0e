use artifact_pipeline::backoff::BackoffPolicy;
use artifact_pipeline::pipeline::{OrchestratorConfig, StatusMismatchPolicy};
use artifact_pipeline::tools::{CommandTool, CommandToolConfig, ToolKind, ToolRegistry};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub storage: StorageConfig,
    pub backoff: BackoffPolicy,
    pub pipeline: PipelineConfig,
    /// Command per tool, keyed by tool name
    pub tools: HashMap<String, CommandToolConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("artifact-pipeline"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub status_mismatch: StatusMismatchPolicy,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            status_mismatch: StatusMismatchPolicy::Warn,
            show_progress: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            storage: StorageConfig::default(),
            backoff: BackoffPolicy::default(),
            pipeline: PipelineConfig::default(),
            tools: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Filter for env_logger. An explicit `RUST_LOG` wins over `log_level`.
    pub fn log_filter(&self, rust_log: Option<&str>) -> Option<String> {
        match rust_log {
            Some(_) => None,
            None => self.log_level.clone(),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            backoff: self.backoff.clone(),
            status_mismatch: self.pipeline.status_mismatch,
        }
    }

    /// Build a registry with one command tool per configured tool.
    ///
    /// Unknown tool names are rejected; a missing tool is left for the
    /// orchestrator to report.
    pub fn build_registry(&self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for (name, tool_config) in &self.tools {
            let kind: ToolKind = name
                .parse()
                .context(format!("Invalid entry under tools: {}", name))?;
            registry.register(kind, Arc::new(CommandTool::new(kind, tool_config.clone())));
        }
        Ok(registry)
    }
}
