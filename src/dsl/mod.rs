pub mod builder;
pub mod loader;

use crate::error::{Result, ValidationError};
use crate::model::graph::{FlowGraph, NodeId};
use crate::model::{Flow, FlowMetadata};
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A flow as authored in YAML: questions are named by keys, transitions
/// refer to those keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSpec {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionSpec {
    pub from: String,
    pub to: String,
    /// Answer that selects this transition.
    pub when: String,
}

/// Result of compiling a [`FlowDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDraft {
    pub name: String,
    pub description: String,
    pub questions: FlowGraph,
    /// Document key -> arena id.
    pub keys: IndexMap<String, NodeId>,
}

impl FlowDocument {
    /// Builds the question graph through the regular graph operations, so
    /// unknown keys, self-loops and duplicate conditions are rejected here.
    pub fn compile(&self) -> Result<FlowDraft> {
        let mut graph = FlowGraph::new();
        let mut keys = IndexMap::with_capacity(self.questions.len());

        for question in &self.questions {
            if keys.contains_key(&question.key) {
                return Err(ValidationError::DuplicateQuestionKey(question.key.clone()).into());
            }
            let id = graph.add_node(question.text.clone());
            keys.insert(question.key.clone(), id);
        }

        for transition in &self.transitions {
            let source = resolve(&keys, &transition.from)?;
            let target = resolve(&keys, &transition.to)?;
            graph.add_edge(source, target, transition.when.clone())?;
        }

        Ok(FlowDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            questions: graph,
            keys,
        })
    }
}

fn resolve(keys: &IndexMap<String, NodeId>, key: &str) -> Result<NodeId> {
    keys.get(key)
        .copied()
        .ok_or_else(|| ValidationError::UnknownQuestionKey(key.to_string()).into())
}

impl FlowDraft {
    pub fn node(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    pub fn metadata(&self) -> FlowMetadata {
        FlowMetadata::name(self.name.clone()).with_description(self.description.clone())
    }

    /// A standalone inactive flow, used for test runs outside the store.
    pub fn into_flow(self) -> Flow {
        let mut flow = Flow::new(Utc::now());
        flow.name = self.name;
        flow.description = self.description;
        flow.questions = self.questions;
        flow
    }
}
