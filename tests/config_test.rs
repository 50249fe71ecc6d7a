use flowdesk::config::{AppConfig, DEFAULT_LOG_FILTER, StorageConfig};
use std::fs;
use std::path::PathBuf;

#[test]
fn test_defaults_without_file() {
    let config = AppConfig::load(None).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    assert_eq!(
        config.storage,
        StorageConfig::Yaml {
            path: PathBuf::from("flows.yaml")
        }
    );
}

#[test]
fn test_load_yaml_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file_path = temp_dir.path().join("flowdesk.yaml");
    fs::write(
        &file_path,
        r#"
storage:
  backend: yaml
  path: "/var/lib/flowdesk/flows.yaml"
log_filter: "flowdesk=debug"
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&file_path)).unwrap();
    assert_eq!(config.log_filter, "flowdesk=debug");
    assert_eq!(
        config.storage,
        StorageConfig::Yaml {
            path: PathBuf::from("/var/lib/flowdesk/flows.yaml")
        }
    );
}

#[tokio::test]
async fn test_memory_backend_opens_empty_store() {
    let config: AppConfig = serde_yaml::from_str("storage:\n  backend: memory\n").unwrap();
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);

    let store = config.open_store().await.unwrap();
    assert!(store.list().await.is_empty());
}
