//! Conversational flow graphs for the admin back office: a store of chatbot
//! flows with a single active flow, an editor session for the flow being
//! edited, and an interpreter that replays scripted answers ("Test Flow").

pub mod config;
pub mod dsl;
pub mod editor;
pub mod error;
pub mod model;
pub mod runtime;
pub mod store;

pub use editor::FlowEditorSession;
pub use error::{FlowError, InterpreterError, NotFound, ValidationError};
pub use model::graph::{EdgeId, FlowGraph, GraphProblem, NodeId, QuestionNode, TransitionEdge};
pub use model::{Flow, FlowId, FlowMetadata, FlowStatus};
pub use runtime::{FlowInterpreter, RunOutcome, RunState, TerminationReason, Transcript};
pub use store::FlowStore;
