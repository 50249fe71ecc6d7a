use flowdesk::dsl::builder::FlowDocumentBuilder;
use flowdesk::{FlowError, FlowStatus, ValidationError};

#[test]
fn test_build_branching_document() {
    let document = FlowDocumentBuilder::new("Support triage")
        .description("Routes visitors to the right queue")
        .question("start", "Is this about an order?")
        .question("order", "Do you have your order number?")
        .question("other", "Please describe your issue.")
        .transition("start", "order", "yes")
        .transition("start", "other", "no")
        .build();

    assert_eq!(document.name, "Support triage");
    assert_eq!(document.questions.len(), 3);
    assert_eq!(document.transitions.len(), 2);

    let draft = document.compile().expect("Compilation failed");
    let start = draft.node("start").unwrap();
    let order = draft.node("order").unwrap();

    assert_eq!(draft.questions.start_node(), Ok(start));
    assert_eq!(draft.questions.route(start, "yes").unwrap().target, order);
    assert!(draft.questions.validate().is_empty());
    // Keys keep document order.
    assert_eq!(
        draft.keys.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["start", "order", "other"]
    );
}

#[test]
fn test_compile_rejects_unknown_key() {
    let err = FlowDocumentBuilder::new("Typo")
        .question("start", "Hello?")
        .transition("start", "missing", "yes")
        .build()
        .compile()
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::Validation(ValidationError::UnknownQuestionKey(ref key)) if key == "missing"
    ));
}

#[test]
fn test_compile_rejects_duplicate_key() {
    let err = FlowDocumentBuilder::new("Dup")
        .question("start", "Hello?")
        .question("start", "Hello again?")
        .build()
        .compile()
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::Validation(ValidationError::DuplicateQuestionKey(_))
    ));
}

#[test]
fn test_compile_applies_graph_rules() {
    let duplicate = FlowDocumentBuilder::new("Ambiguous")
        .question("a", "A?")
        .question("b", "B?")
        .question("c", "C?")
        .transition("a", "b", "ok")
        .transition("a", "c", "ok")
        .build()
        .compile();
    assert!(matches!(
        duplicate,
        Err(FlowError::Validation(ValidationError::DuplicateCondition { .. }))
    ));

    let self_loop = FlowDocumentBuilder::new("Loop")
        .question("a", "Again?")
        .transition("a", "a", "again")
        .build()
        .compile();
    assert!(matches!(
        self_loop,
        Err(FlowError::Validation(ValidationError::SelfLoop(_)))
    ));
}

#[test]
fn test_draft_into_flow_is_inactive() {
    let flow = FlowDocumentBuilder::new("Standalone")
        .question("only", "Bye")
        .build()
        .compile()
        .unwrap()
        .into_flow();

    assert_eq!(flow.name, "Standalone");
    assert_eq!(flow.status, FlowStatus::Inactive);
    assert_eq!(flow.questions.len(), 1);
}
