use flowdesk::dsl::builder::FlowDocumentBuilder;
use flowdesk::dsl::loader;
use std::fs;

#[test]
fn test_load_simple_yaml_document() {
    let yaml_content = r#"
name: "Shipping"
description: "Where is my parcel?"
questions:
  - key: "start"
    text: "Has your parcel shipped?"
  - key: "track"
    text: "Here is your tracking link."
  - key: "wait"
    text: "It will ship within two days."
transitions:
  - from: "start"
    to: "track"
    when: "yes"
  - from: "start"
    to: "wait"
    when: "no"
"#;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("shipping.yaml");
    fs::write(&file_path, yaml_content).expect("Failed to write temp file");

    let loaded = loader::load_flow_document_from_yaml(&file_path)
        .expect("Failed to load flow document from YAML");

    let expected = FlowDocumentBuilder::new("Shipping")
        .description("Where is my parcel?")
        .question("start", "Has your parcel shipped?")
        .question("track", "Here is your tracking link.")
        .question("wait", "It will ship within two days.")
        .transition("start", "track", "yes")
        .transition("start", "wait", "no")
        .build();

    assert_eq!(loaded, expected);

    temp_dir.close().expect("Failed to close temp dir");
}

#[test]
fn test_load_missing_file_has_context() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("nope.yaml");

    let err = loader::load_flow_document_from_yaml(&missing).unwrap_err();
    assert!(err.to_string().contains("Failed to read YAML file"));
}

#[test]
fn test_load_invalid_yaml_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file_path = temp_dir.path().join("broken.yaml");
    fs::write(&file_path, "questions: [unterminated").unwrap();

    let err = loader::load_flow_document_from_yaml(&file_path).unwrap_err();
    assert!(err.to_string().contains("Failed to deserialize YAML content"));
}
