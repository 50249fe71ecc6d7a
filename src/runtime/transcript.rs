use crate::model::graph::NodeId;
use serde::Serialize;
use std::fmt;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub node_id: NodeId,
    pub question: String,
    pub answer: String,
}

/// Why a run stopped. Dead ends are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    TerminalNodeReached,
    NoMatchingTransition { answer: String },
    Aborted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::TerminalNodeReached => write!(f, "terminal node reached"),
            TerminationReason::NoMatchingTransition { .. } => write!(f, "no matching transition"),
            TerminationReason::Aborted => write!(f, "aborted by caller"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Question the run stopped at; `None` when aborted before starting.
    pub node_id: Option<NodeId>,
    #[serde(flatten)]
    pub reason: TerminationReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
    pub outcome: Option<RunOutcome>,
}

impl Transcript {
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn answers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.answer.as_str())
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "[{}] {}", entry.node_id, entry.question)?;
            writeln!(f, "  > {}", entry.answer)?;
        }
        let Some(outcome) = &self.outcome else {
            return write!(f, "conversation in progress");
        };
        write!(f, "conversation ended: {}", outcome.reason)?;
        if let TerminationReason::NoMatchingTransition { answer } = &outcome.reason {
            write!(f, " for '{}'", answer)?;
        }
        match outcome.node_id {
            Some(node_id) => write!(f, " at {}", node_id),
            None => Ok(()),
        }
    }
}
