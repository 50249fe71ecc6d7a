use crate::error::{Result, ValidationError};
use crate::model::graph::{EdgeId, FlowGraph, NodeId, QuestionNode, TransitionEdge};
use crate::model::{Flow, FlowId, FlowMetadata};
use crate::store::FlowStore;
use tracing::{debug, info, warn};

/// Editing state for the one flow a user currently has open.
///
/// The session owns the only mutable working copy. Renderers read it through
/// [`FlowEditorSession::working_copy`] and change it through the edit methods.
#[derive(Debug, Clone)]
pub struct FlowEditorSession {
    working: Flow,
    saved: Flow,
    dirty: bool,
}

impl FlowEditorSession {
    pub fn open(flow: &Flow) -> Self {
        debug!(flow_id = %flow.id, "Editor session opened");
        Self {
            working: flow.clone(),
            saved: flow.clone(),
            dirty: false,
        }
    }

    pub fn flow_id(&self) -> FlowId {
        self.working.id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn working_copy(&self) -> &Flow {
        &self.working
    }

    /// The flow as it was when opened or last saved.
    pub fn saved_copy(&self) -> &Flow {
        &self.saved
    }

    pub fn edit_node_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<()> {
        self.working.questions.set_node_text(node, text)?;
        self.dirty = true;
        Ok(())
    }

    pub fn edit_flow_metadata(&mut self, fields: FlowMetadata) {
        if fields.is_empty() {
            return;
        }
        if let Some(name) = fields.name {
            self.working.name = name;
        }
        if let Some(description) = fields.description {
            self.working.description = description;
        }
        self.dirty = true;
    }

    pub fn add_question(&mut self, text: impl Into<String>) -> NodeId {
        self.dirty = true;
        self.working.questions.add_node(text)
    }

    pub fn remove_question(&mut self, node: NodeId) -> Result<QuestionNode> {
        let removed = self.working.questions.remove_node(node)?;
        self.dirty = true;
        Ok(removed)
    }

    pub fn add_transition(
        &mut self,
        source: NodeId,
        target: NodeId,
        condition: impl Into<String>,
    ) -> Result<EdgeId> {
        let id = self.working.questions.add_edge(source, target, condition)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn remove_transition(&mut self, edge: EdgeId) -> Result<TransitionEdge> {
        let removed = self.working.questions.remove_edge(edge)?;
        self.dirty = true;
        Ok(removed)
    }

    /// Swaps in a whole question graph, e.g. one compiled from a flow document.
    pub fn replace_questions(&mut self, graph: FlowGraph) {
        self.working.questions = graph;
        self.dirty = true;
    }

    /// Checks the working copy the same way `save` does.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.working.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let problems = self.working.questions.validate();
        if !problems.is_empty() {
            return Err(ValidationError::Structural(problems));
        }
        Ok(())
    }

    /// Validates and commits the working copy through the store.
    /// On failure nothing is written and the session stays dirty.
    pub async fn save(&mut self, store: &FlowStore) -> Result<&Flow> {
        if let Err(e) = self.check() {
            warn!(flow_id = %self.working.id, error = %e, "Flow rejected on save");
            return Err(e.into());
        }
        let stored = store.update(self.working.clone()).await?;
        self.working = stored.clone();
        self.saved = stored;
        self.dirty = false;
        info!(flow_id = %self.working.id, "Flow saved");
        Ok(&self.working)
    }

    /// Reverts to the last saved state without touching the store.
    pub fn discard(&mut self) {
        self.working = self.saved.clone();
        self.dirty = false;
        debug!(flow_id = %self.working.id, "Unsaved edits discarded");
    }

    /// Ends the session. Returns `true` when unsaved edits were dropped.
    pub fn close(self) -> bool {
        if self.dirty {
            debug!(flow_id = %self.working.id, "Editor session closed with unsaved edits");
        }
        self.dirty
    }
}
