pub mod repository;
pub mod yaml_storage;

use crate::error::{FlowError, NotFound, Result};
use crate::model::{Flow, FlowId, FlowStatus};
use chrono::Utc;
use indexmap::IndexMap;
use repository::{FlowRepository, InMemoryFlowRepository};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct StoreState {
    // Creation order.
    flows: IndexMap<FlowId, Flow>,
    active: Option<FlowId>,
}

/// The collection of flows and the single active-flow pointer.
///
/// Every mutation runs under one write guard and reaches the repository
/// before the in-memory collection changes, so a failed `persist` leaves
/// the collection exactly as it was. `status` is written only by
/// [`FlowStore::set_active`].
pub struct FlowStore {
    repository: Arc<dyn FlowRepository>,
    state: RwLock<StoreState>,
}

impl FlowStore {
    /// An empty store over a fresh in-memory repository.
    pub fn in_memory() -> Self {
        Self {
            repository: Arc::new(InMemoryFlowRepository::new()),
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Builds the store from everything the repository currently holds.
    pub async fn load(repository: Arc<dyn FlowRepository>) -> Result<Self> {
        let mut stored = repository
            .load_all()
            .await
            .map_err(FlowError::Persistence)?;
        stored.sort_by_key(|flow| flow.created_at);

        let mut state = StoreState::default();
        for mut flow in stored {
            if state.flows.contains_key(&flow.id) {
                warn!(flow_id = %flow.id, "Flow stored more than once, keeping the earliest entry");
                continue;
            }
            if flow.is_active() {
                if state.active.is_none() {
                    state.active = Some(flow.id);
                } else {
                    warn!(flow_id = %flow.id, "More than one active flow stored, deactivating");
                    flow.status = FlowStatus::Inactive;
                    flow = repository
                        .persist(flow)
                        .await
                        .map_err(FlowError::Persistence)?;
                }
            }
            state.flows.insert(flow.id, flow);
        }

        info!(flows = state.flows.len(), active = ?state.active, "Flow store loaded");
        Ok(Self {
            repository,
            state: RwLock::new(state),
        })
    }

    pub async fn list(&self) -> Vec<Flow> {
        self.state.read().await.flows.values().cloned().collect()
    }

    pub async fn get(&self, id: FlowId) -> Result<Flow> {
        self.state
            .read()
            .await
            .flows
            .get(&id)
            .cloned()
            .ok_or_else(|| NotFound::Flow(id).into())
    }

    pub async fn active_flow_id(&self) -> Option<FlowId> {
        self.state.read().await.active
    }

    pub async fn active_flow(&self) -> Option<Flow> {
        let state = self.state.read().await;
        state.active.and_then(|id| state.flows.get(&id).cloned())
    }

    pub async fn create(&self) -> Result<Flow> {
        let mut state = self.state.write().await;
        let flow = self
            .repository
            .persist(Flow::new(Utc::now()))
            .await
            .map_err(FlowError::Persistence)?;
        state.flows.insert(flow.id, flow.clone());
        info!(flow_id = %flow.id, "Flow created");
        Ok(flow)
    }

    /// Replaces the stored flow with the same id.
    ///
    /// `updated_at` is stamped here; the stored `status` and `created_at`
    /// win over whatever the caller passes.
    pub async fn update(&self, mut flow: Flow) -> Result<Flow> {
        let mut state = self.state.write().await;
        let current = state.flows.get(&flow.id).ok_or(NotFound::Flow(flow.id))?;
        flow.status = current.status;
        flow.created_at = current.created_at;
        flow.updated_at = Utc::now();

        let stored = self
            .repository
            .persist(flow)
            .await
            .map_err(FlowError::Persistence)?;
        state.flows.insert(stored.id, stored.clone());
        debug!(flow_id = %stored.id, questions = stored.questions.len(), "Flow updated");
        Ok(stored)
    }

    pub async fn delete(&self, id: FlowId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.flows.contains_key(&id) {
            return Err(NotFound::Flow(id).into());
        }
        self.repository
            .remove(id)
            .await
            .map_err(FlowError::Persistence)?;
        state.flows.shift_remove(&id);
        if state.active == Some(id) {
            state.active = None;
            info!(flow_id = %id, "Active flow deleted, no flow is active now");
        } else {
            info!(flow_id = %id, "Flow deleted");
        }
        Ok(())
    }

    /// Makes `id` the only active flow.
    pub async fn set_active(&self, id: FlowId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.flows.contains_key(&id) {
            return Err(NotFound::Flow(id).into());
        }

        // Deactivations first, the activation last.
        let (mut changes, activation): (Vec<Flow>, Vec<Flow>) = state
            .flows
            .values()
            .filter_map(|flow| {
                let desired = if flow.id == id {
                    FlowStatus::Active
                } else {
                    FlowStatus::Inactive
                };
                (flow.status != desired).then(|| Flow {
                    status: desired,
                    ..flow.clone()
                })
            })
            .partition(|flow| flow.status == FlowStatus::Inactive);
        changes.extend(activation);

        let mut persisted = Vec::with_capacity(changes.len());
        for flow in changes {
            match self.repository.persist(flow).await {
                Ok(stored) => persisted.push(stored),
                Err(e) => {
                    self.roll_back(&state, &persisted).await;
                    return Err(FlowError::Persistence(e));
                }
            }
        }

        for flow in persisted {
            state.flows.insert(flow.id, flow);
        }
        state.active = Some(id);
        info!(flow_id = %id, "Flow activated");
        Ok(())
    }

    async fn roll_back(&self, state: &StoreState, persisted: &[Flow]) {
        for flow in persisted {
            let Some(original) = state.flows.get(&flow.id) else {
                continue;
            };
            if let Err(e) = self.repository.persist(original.clone()).await {
                error!(flow_id = %flow.id, error = ?e, "Failed to roll back flow status");
            }
        }
    }
}
