use crate::error::{NotFound, Result, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// Identifier of a question, unique within its flow and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

/// Identifier of a transition, unique within its flow and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl EdgeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A prompt shown to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionNode {
    pub id: NodeId,
    pub text: String,
}

/// A directed, condition-labelled link between two questions of the same flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Answer token that selects this transition (exact match).
    pub condition: String,
}

/// Structural problems reported by [`FlowGraph::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphProblem {
    #[error("transition '{edge}' references missing question '{missing}'")]
    DanglingEdge { edge: EdgeId, missing: NodeId },

    #[error("question '{node}' has more than one transition for '{condition}'")]
    AmbiguousCondition { node: NodeId, condition: String },

    #[error("transition '{edge}' loops back to its own question")]
    SelfLoop { edge: EdgeId },

    #[error("no start question: every question has an incoming transition")]
    MissingStartNode,

    #[error("multiple start questions: {}", join_ids(.candidates))]
    AmbiguousStartNode { candidates: Vec<NodeId> },

    #[error("question '{node}' is unreachable from the start question")]
    UnreachableNode { node: NodeId },
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Arena holding one flow's questions and transitions.
///
/// Nodes and edges live in flat id-indexed maps kept in creation order; every
/// cross reference is an id resolved through these maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphRepr", into = "GraphRepr")]
pub struct FlowGraph {
    nodes: IndexMap<NodeId, QuestionNode>,
    edges: IndexMap<EdgeId, TransitionEdge>,
    last_node: u32,
    last_edge: u32,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, text: impl Into<String>) -> NodeId {
        self.last_node += 1;
        let id = NodeId(self.last_node);
        self.nodes.insert(
            id,
            QuestionNode {
                id,
                text: text.into(),
            },
        );
        id
    }

    /// Removes a question together with every transition touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<QuestionNode> {
        let node = self.nodes.shift_remove(&id).ok_or(NotFound::Node(id))?;
        self.edges
            .retain(|_, edge| edge.source != id && edge.target != id);
        Ok(node)
    }

    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        condition: impl Into<String>,
    ) -> Result<EdgeId> {
        let condition = condition.into();
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(ValidationError::UnknownNode(endpoint).into());
            }
        }
        if source == target {
            return Err(ValidationError::SelfLoop(source).into());
        }
        if condition.trim().is_empty() {
            return Err(ValidationError::EmptyCondition.into());
        }
        if self.outgoing(source).any(|edge| edge.condition == condition) {
            return Err(ValidationError::DuplicateCondition {
                node: source,
                condition,
            }
            .into());
        }

        self.last_edge += 1;
        let id = EdgeId(self.last_edge);
        self.edges.insert(
            id,
            TransitionEdge {
                id,
                source,
                target,
                condition,
            },
        );
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<TransitionEdge> {
        self.edges
            .shift_remove(&id)
            .ok_or_else(|| NotFound::Edge(id).into())
    }

    pub fn set_node_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(NotFound::Node(id))?;
        node.text = text.into();
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&QuestionNode> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&TransitionEdge> {
        self.edges.get(&id)
    }

    /// Questions in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &QuestionNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &TransitionEdge> {
        self.edges.values()
    }

    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &TransitionEdge> {
        self.edges.values().filter(move |edge| edge.source == node)
    }

    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &TransitionEdge> {
        self.edges.values().filter(move |edge| edge.target == node)
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.outgoing(node).next().is_none()
    }

    /// The outgoing transition of `node` whose condition equals `answer` exactly.
    pub fn route(&self, node: NodeId, answer: &str) -> Option<&TransitionEdge> {
        self.outgoing(node).find(|edge| edge.condition == answer)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The only question without incoming transitions.
    pub fn start_node(&self) -> std::result::Result<NodeId, GraphProblem> {
        let candidates: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| self.incoming(*id).next().is_none())
            .collect();

        match candidates.len() {
            1 => Ok(candidates[0]),
            0 => Err(GraphProblem::MissingStartNode),
            _ => Err(GraphProblem::AmbiguousStartNode { candidates }),
        }
    }

    /// Reports structural problems without mutating the graph.
    /// An empty graph is considered valid.
    pub fn validate(&self) -> Vec<GraphProblem> {
        let mut problems = Vec::new();

        for edge in self.edges.values() {
            let mut endpoints = vec![edge.source];
            if edge.target != edge.source {
                endpoints.push(edge.target);
            }
            for endpoint in endpoints {
                if !self.nodes.contains_key(&endpoint) {
                    problems.push(GraphProblem::DanglingEdge {
                        edge: edge.id,
                        missing: endpoint,
                    });
                }
            }
            if edge.source == edge.target {
                problems.push(GraphProblem::SelfLoop { edge: edge.id });
            }
        }

        let mut seen: HashMap<(NodeId, &str), usize> = HashMap::new();
        for edge in self.edges.values() {
            let count = seen
                .entry((edge.source, edge.condition.as_str()))
                .or_insert(0);
            *count += 1;
            if *count == 2 {
                problems.push(GraphProblem::AmbiguousCondition {
                    node: edge.source,
                    condition: edge.condition.clone(),
                });
            }
        }

        if self.nodes.is_empty() {
            return problems;
        }

        match self.start_node() {
            Ok(start) => {
                let reachable = self.reachable_from(start);
                problems.extend(
                    self.nodes
                        .keys()
                        .filter(|id| !reachable.contains(*id))
                        .map(|&node| GraphProblem::UnreachableNode { node }),
                );
            }
            Err(problem) => problems.push(problem),
        }

        problems
    }

    fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing(current) {
                if self.nodes.contains_key(&edge.target) && visited.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }
        visited
    }
}

/// Serialized shape of a [`FlowGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GraphRepr {
    #[serde(default)]
    last_question_id: u32,
    #[serde(default)]
    last_transition_id: u32,
    #[serde(default)]
    questions: Vec<QuestionNode>,
    #[serde(default)]
    transitions: Vec<TransitionEdge>,
}

#[derive(Error, Debug)]
pub enum GraphReprError {
    #[error("question id '{0}' appears more than once")]
    DuplicateNode(NodeId),

    #[error("transition id '{0}' appears more than once")]
    DuplicateEdge(EdgeId),

    #[error("{0} id space is exhausted")]
    IdSpaceExhausted(&'static str),
}

impl TryFrom<GraphRepr> for FlowGraph {
    type Error = GraphReprError;

    // Dangling references survive loading so that validate() can report them.
    fn try_from(repr: GraphRepr) -> std::result::Result<Self, Self::Error> {
        let mut graph = FlowGraph {
            last_node: repr.last_question_id,
            last_edge: repr.last_transition_id,
            ..FlowGraph::default()
        };
        for node in repr.questions {
            graph.last_node = graph.last_node.max(node.id.0);
            if let Some(dup) = graph.nodes.insert(node.id, node) {
                return Err(GraphReprError::DuplicateNode(dup.id));
            }
        }
        for edge in repr.transitions {
            graph.last_edge = graph.last_edge.max(edge.id.0);
            if let Some(dup) = graph.edges.insert(edge.id, edge) {
                return Err(GraphReprError::DuplicateEdge(dup.id));
            }
        }
        // add_node/add_edge bump the counters and must always get a fresh id.
        if graph.last_node == u32::MAX {
            return Err(GraphReprError::IdSpaceExhausted("question"));
        }
        if graph.last_edge == u32::MAX {
            return Err(GraphReprError::IdSpaceExhausted("transition"));
        }
        Ok(graph)
    }
}

impl From<FlowGraph> for GraphRepr {
    fn from(graph: FlowGraph) -> Self {
        Self {
            last_question_id: graph.last_node,
            last_transition_id: graph.last_edge,
            questions: graph.nodes.into_values().collect(),
            transitions: graph.edges.into_values().collect(),
        }
    }
}
