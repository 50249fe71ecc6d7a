use flowdesk::dsl::loader::load_flow_document_from_yaml;
use flowdesk::{FlowInterpreter, TerminationReason};
use std::path::PathBuf;

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

#[test]
fn test_support_triage_demo_runs() {
    let document = load_flow_document_from_yaml(demo_path("support_triage.yaml"))
        .expect("demo should load");
    let draft = document.compile().expect("demo should compile");
    assert!(draft.questions.validate().is_empty());

    let flow = draft.clone().into_flow();
    let mut interpreter = FlowInterpreter::new(&flow).unwrap();

    let transcript = interpreter.run(["yes", "no"]).clone();
    let outcome = transcript.outcome.unwrap();
    assert_eq!(outcome.node_id, draft.node("find"));
    assert_eq!(outcome.reason, TerminationReason::TerminalNodeReached);

    let transcript = interpreter.run(["no"]);
    assert_eq!(
        transcript.outcome.as_ref().unwrap().node_id,
        draft.node("general")
    );
}
