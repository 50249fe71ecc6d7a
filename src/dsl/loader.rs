use crate::dsl::FlowDocument;
use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::Path;

pub fn load_flow_document_from_yaml(file_path: impl AsRef<Path>) -> Result<FlowDocument> {
    let file_path = file_path.as_ref();
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path.display()))?;

    let document: FlowDocument = serde_yaml::from_str(&yaml_content).with_context(|| {
        format!("Failed to deserialize YAML content from {}", file_path.display())
    })?;

    Ok(document)
}
