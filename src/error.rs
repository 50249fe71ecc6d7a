use crate::model::FlowId;
use crate::model::graph::{EdgeId, GraphProblem, NodeId};
use thiserror::Error;

pub type Result<T, E = FlowError> = std::result::Result<T, E>;

/// Top-level error returned by store, editor and interpreter operations.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    /// Failure reported by the persistence collaborator. Never retried here.
    #[error("persistence failed: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// User-correctable input problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("flow name must not be empty")]
    EmptyName,

    #[error("transition references unknown question '{0}'")]
    UnknownNode(NodeId),

    #[error("question '{0}' cannot transition to itself")]
    SelfLoop(NodeId),

    #[error("transition condition must not be empty")]
    EmptyCondition,

    #[error("question '{node}' already has a transition for '{condition}'")]
    DuplicateCondition { node: NodeId, condition: String },

    #[error("flow document references unknown question key '{0}'")]
    UnknownQuestionKey(String),

    #[error("flow document declares question key '{0}' more than once")]
    DuplicateQuestionKey(String),

    #[error("flow graph has {} structural problem(s): {}", .0.len(), list_problems(.0))]
    Structural(Vec<GraphProblem>),
}

/// A stale reference: the id is not (or no longer) present.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    #[error("flow '{0}' not found")]
    Flow(FlowId),

    #[error("question '{0}' not found")]
    Node(NodeId),

    #[error("transition '{0}' not found")]
    Edge(EdgeId),
}

/// Precondition failures raised before a test run produces any transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("flow has no questions to run")]
    EmptyFlow,

    #[error("flow cannot be run: {}", list_problems(.0))]
    InvalidFlow(Vec<GraphProblem>),

    #[error("interpreter is not waiting for an answer")]
    NotAwaitingAnswer,
}

fn list_problems(problems: &[GraphProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
