pub mod graph;

use chrono::{DateTime, Utc};
use graph::FlowGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_FLOW_NAME: &str = "Untitled flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(Uuid);

impl FlowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FlowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Active,
    #[default]
    Inactive,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::Active => f.pad("active"),
            FlowStatus::Inactive => f.pad("inactive"),
        }
    }
}

/// A named chatbot conversation and the graph of questions it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: FlowId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    // Only FlowStore writes this field.
    #[serde(default)]
    pub status: FlowStatus,
    #[serde(default)]
    pub questions: FlowGraph,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flow {
    /// A fresh, empty and inactive flow.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: FlowId::new(),
            name: DEFAULT_FLOW_NAME.to_string(),
            description: String::new(),
            status: FlowStatus::Inactive,
            questions: FlowGraph::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FlowStatus::Active
    }
}

/// Editable descriptive fields of a flow. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl FlowMetadata {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
