use crate::error::Result as FlowResult;
use crate::store::FlowStore;
use crate::store::repository::{FlowRepository, InMemoryFlowRepository};
use crate::store::yaml_storage::YamlFileRepository;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_FLOWS_FILE: &str = "flows.yaml";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Where flows are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    Memory,
    Yaml { path: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Yaml {
            path: PathBuf::from(DEFAULT_FLOWS_FILE),
        }
    }
}

impl StorageConfig {
    pub fn repository(&self) -> Arc<dyn FlowRepository> {
        match self {
            StorageConfig::Memory => Arc::new(InMemoryFlowRepository::new()),
            StorageConfig::Yaml { path } => Arc::new(YamlFileRepository::new(path.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    /// `tracing-subscriber` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Reads `path` when given, otherwise falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub async fn open_store(&self) -> FlowResult<FlowStore> {
        FlowStore::load(self.storage.repository()).await
    }
}
