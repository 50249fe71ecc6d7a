use flowdesk::store::repository::FlowRepository;
use flowdesk::store::yaml_storage::YamlFileRepository;
use chrono::Utc;
use flowdesk::{Flow, FlowEditorSession, FlowMetadata, FlowStatus, FlowStore};
use std::sync::Arc;

#[tokio::test]
async fn test_flows_survive_reload_from_yaml_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("data").join("flows.yaml");

    let (first_id, second_id, greet) = {
        let store = FlowStore::load(Arc::new(YamlFileRepository::new(&path)))
            .await
            .unwrap();
        let first = store.create().await.unwrap();
        let second = store.create().await.unwrap();

        let mut session = FlowEditorSession::open(&first);
        session.edit_flow_metadata(FlowMetadata::name("Greeting"));
        let greet = session.add_question("Hello! Need anything?");
        let bye = session.add_question("Bye!");
        session.add_transition(greet, bye, "no").unwrap();
        session.save(&store).await.unwrap();

        store.set_active(second.id).await.unwrap();
        (first.id, second.id, greet)
    };

    let repo = Arc::new(YamlFileRepository::new(&path));
    let store = FlowStore::load(repo.clone()).await.unwrap();
    let flows = store.list().await;

    assert_eq!(
        flows.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![first_id, second_id]
    );
    assert_eq!(store.active_flow_id().await, Some(second_id));
    assert_eq!(flows[0].status, FlowStatus::Inactive);
    assert_eq!(flows[0].name, "Greeting");
    assert_eq!(
        flows[0].questions.node(greet).unwrap().text,
        "Hello! Need anything?"
    );
    assert!(flows[0].questions.validate().is_empty());

    store.delete(first_id).await.unwrap();
    assert_eq!(repo.load_all().await.unwrap().len(), 1);

    temp_dir.close().expect("Failed to close temp dir");
}

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = YamlFileRepository::new(temp_dir.path().join("absent.yaml"));

    assert!(repo.load_all().await.unwrap().is_empty());
    assert!(repo.remove(flowdesk::FlowId::new()).await.is_err());
}

#[tokio::test]
async fn test_duplicate_entries_keep_earliest_flow() {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(YamlFileRepository::new(temp_dir.path().join("flows.yaml")));

    let original = Flow::new(Utc::now());
    let mut copy = original.clone();
    copy.name = "Shadow".to_string();
    copy.created_at = original.created_at + chrono::Duration::seconds(1);

    let mut file = serde_yaml::Mapping::new();
    file.insert(
        "flows".into(),
        serde_yaml::to_value(vec![copy, original.clone()]).unwrap(),
    );
    std::fs::write(repo.path(), serde_yaml::to_string(&file).unwrap()).unwrap();

    let store = FlowStore::load(repo.clone()).await.unwrap();
    let flows = store.list().await;
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].name, original.name);
}
