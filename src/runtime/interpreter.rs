use crate::error::InterpreterError;
use crate::model::graph::{FlowGraph, NodeId, QuestionNode};
use crate::model::{Flow, FlowId};
use crate::runtime::transcript::{RunOutcome, TerminationReason, Transcript, TranscriptEntry};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    AwaitingStart,
    AwaitingAnswer(NodeId),
    Terminated(RunOutcome),
}

/// Replays scripted answers through a private copy of a flow's graph.
///
/// Routing depends only on the graph and the answers, so the same answer
/// sequence always yields the same transcript. The interpreter never writes
/// back to the store.
#[derive(Debug, Clone)]
pub struct FlowInterpreter {
    flow_id: FlowId,
    graph: FlowGraph,
    start: NodeId,
    state: RunState,
    transcript: Transcript,
}

impl FlowInterpreter {
    /// Fails before any step if the flow is empty or structurally invalid.
    pub fn new(flow: &Flow) -> Result<Self, InterpreterError> {
        if flow.questions.is_empty() {
            return Err(InterpreterError::EmptyFlow);
        }
        let problems = flow.questions.validate();
        if !problems.is_empty() {
            return Err(InterpreterError::InvalidFlow(problems));
        }
        let start = flow
            .questions
            .start_node()
            .map_err(|problem| InterpreterError::InvalidFlow(vec![problem]))?;

        Ok(Self {
            flow_id: flow.id,
            graph: flow.questions.clone(),
            start,
            state: RunState::AwaitingStart,
            transcript: Transcript::default(),
        })
    }

    pub fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    pub fn start_node(&self) -> NodeId {
        self.start
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, RunState::Terminated(_))
    }

    pub fn current_question(&self) -> Option<&QuestionNode> {
        match self.state {
            RunState::AwaitingAnswer(node) => self.graph.node(node),
            _ => None,
        }
    }

    /// Conditions the current question accepts, in transition order.
    pub fn expected_answers(&self) -> Vec<&str> {
        match self.state {
            RunState::AwaitingAnswer(node) => self
                .graph
                .outgoing(node)
                .map(|edge| edge.condition.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Moves to the start question. Does nothing once a run is under way.
    pub fn start(&mut self) -> &RunState {
        if self.state == RunState::AwaitingStart {
            debug!(flow_id = %self.flow_id, node = %self.start, "Test run started");
            self.enter(self.start);
        }
        &self.state
    }

    pub fn answer(&mut self, answer: &str) -> Result<&RunState, InterpreterError> {
        let RunState::AwaitingAnswer(current) = self.state else {
            return Err(InterpreterError::NotAwaitingAnswer);
        };

        match self.graph.route(current, answer).map(|edge| edge.target) {
            Some(target) => {
                let question = self
                    .graph
                    .node(current)
                    .map(|node| node.text.clone())
                    .unwrap_or_default();
                self.transcript.entries.push(TranscriptEntry {
                    node_id: current,
                    question,
                    answer: answer.to_string(),
                });
                debug!(flow_id = %self.flow_id, from = %current, to = %target, answer, "Transition taken");
                self.enter(target);
            }
            None => {
                debug!(flow_id = %self.flow_id, node = %current, answer, "No matching transition");
                self.terminate(
                    Some(current),
                    TerminationReason::NoMatchingTransition {
                        answer: answer.to_string(),
                    },
                );
            }
        }
        Ok(&self.state)
    }

    /// Stops the run. Has no effect on a run that already ended.
    pub fn abort(&mut self) {
        let node = match self.state {
            RunState::AwaitingStart => None,
            RunState::AwaitingAnswer(node) => Some(node),
            RunState::Terminated(_) => return,
        };
        self.terminate(node, TerminationReason::Aborted);
    }

    pub fn restart(&mut self) {
        self.state = RunState::AwaitingStart;
        self.transcript = Transcript::default();
    }

    /// Restarts, then feeds `answers` until they run out or the run ends.
    pub fn run<I, S>(&mut self, answers: I) -> &Transcript
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.restart();
        self.start();
        for answer in answers {
            if self.answer(answer.as_ref()).is_err() {
                break;
            }
        }
        &self.transcript
    }

    fn enter(&mut self, node: NodeId) {
        if self.graph.is_terminal(node) {
            self.terminate(Some(node), TerminationReason::TerminalNodeReached);
        } else {
            self.state = RunState::AwaitingAnswer(node);
        }
    }

    fn terminate(&mut self, node_id: Option<NodeId>, reason: TerminationReason) {
        let outcome = RunOutcome { node_id, reason };
        self.transcript.outcome = Some(outcome.clone());
        self.state = RunState::Terminated(outcome);
    }
}
