use crate::model::{Flow, FlowId};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Persistence collaborator behind [`FlowStore`](super::FlowStore).
#[async_trait]
pub trait FlowRepository: Send + Sync {
    /// Every stored flow. Order is backend specific.
    async fn load_all(&self) -> Result<Vec<Flow>>;

    /// Inserts or replaces a flow, returning what was stored.
    /// Fails on constraint violations.
    async fn persist(&self, flow: Flow) -> Result<Flow>;

    async fn remove(&self, id: FlowId) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryFlowRepository {
    // Map<FlowId, (insertion seq, Flow)>
    flows: DashMap<FlowId, (u64, Flow)>,
    seq: AtomicU64,
    failing: DashSet<FlowId>,
}

impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flows(flows: impl IntoIterator<Item = Flow>) -> Self {
        let repo = Self::new();
        for flow in flows {
            let seq = repo.seq.fetch_add(1, Ordering::SeqCst);
            repo.flows.insert(flow.id, (seq, flow));
        }
        repo
    }

    /// Makes every subsequent `persist` of `id` fail until cleared.
    pub fn fail_persist_for(&self, id: FlowId) {
        self.failing.insert(id);
    }

    pub fn clear_failures(&self) {
        self.failing.clear();
    }

    pub fn get(&self, id: FlowId) -> Option<Flow> {
        self.flows.get(&id).map(|entry| entry.value().1.clone())
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

#[async_trait]
impl FlowRepository for InMemoryFlowRepository {
    async fn load_all(&self) -> Result<Vec<Flow>> {
        let mut entries: Vec<(u64, Flow)> = self
            .flows
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, flow)| flow).collect())
    }

    async fn persist(&self, flow: Flow) -> Result<Flow> {
        if self.failing.contains(&flow.id) {
            return Err(anyhow!("persist rejected for flow {}", flow.id));
        }
        if flow.name.trim().is_empty() {
            return Err(anyhow!("flow {} has an empty name", flow.id));
        }

        let mut entry = self
            .flows
            .entry(flow.id)
            .or_insert_with(|| (self.seq.fetch_add(1, Ordering::SeqCst), flow.clone()));
        entry.value_mut().1 = flow.clone();
        Ok(flow)
    }

    async fn remove(&self, id: FlowId) -> Result<()> {
        self.flows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("flow {} is not stored", id))
    }
}
