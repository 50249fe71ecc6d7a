use crate::model::{Flow, FlowId};
use crate::store::repository::FlowRepository;
use anyhow::{Context as AnyhowContext, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct FlowFile {
    #[serde(default)]
    flows: Vec<Flow>,
}

/// Keeps the whole flow collection in a single YAML document.
pub struct YamlFileRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl YamlFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<FlowFile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(FlowFile::default()),
            Ok(content) => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse flow file {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FlowFile::default()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read flow file {}", self.path.display())),
        }
    }

    async fn write(&self, file: &FlowFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(file)?;
        let tmp = self.path.with_extension("yaml.tmp");
        tokio::fs::write(&tmp, yaml)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), flows = file.flows.len(), "Flow file written");
        Ok(())
    }
}

#[async_trait]
impl FlowRepository for YamlFileRepository {
    async fn load_all(&self) -> Result<Vec<Flow>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.flows)
    }

    async fn persist(&self, flow: Flow) -> Result<Flow> {
        if flow.name.trim().is_empty() {
            return Err(anyhow!("flow {} has an empty name", flow.id));
        }
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;
        match file.flows.iter_mut().find(|f| f.id == flow.id) {
            Some(existing) => *existing = flow.clone(),
            None => file.flows.push(flow.clone()),
        }
        self.write(&file).await?;
        Ok(flow)
    }

    async fn remove(&self, id: FlowId) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;
        let before = file.flows.len();
        file.flows.retain(|f| f.id != id);
        if file.flows.len() == before {
            return Err(anyhow!("flow {} is not stored in {}", id, self.path.display()));
        }
        self.write(&file).await
    }
}
