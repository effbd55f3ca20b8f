//! Assignment of service clients to agents

use crate::client::{QueryResponse, ServiceClient};
use crate::common::{AgentId, RunContext};
use crate::errors::{BenchError, Result};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A pool entry; `None` when the client for that host could not be built
pub type ClientSlot = Option<Arc<dyn ServiceClient>>;

/// How agents are mapped onto the client pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStrategy {
    /// Every agent shares the first client in the pool
    #[default]
    Single,
    /// Agent `i` uses client `i % pool.len()`
    RoundRobin,
}

impl FromStr for DistributionStrategy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "single" => Ok(DistributionStrategy::Single),
            "round_robin" => Ok(DistributionStrategy::RoundRobin),
            other => Err(BenchError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for DistributionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionStrategy::Single => write!(f, "single"),
            DistributionStrategy::RoundRobin => write!(f, "round_robin"),
        }
    }
}

/// Resolves the client each agent runs against
#[derive(Clone)]
pub struct ClientProvisioner {
    strategy: DistributionStrategy,
    pool: Vec<ClientSlot>,
}

impl ClientProvisioner {
    pub fn new(strategy: DistributionStrategy, pool: Vec<ClientSlot>) -> Result<Self> {
        if pool.is_empty() {
            return Err(BenchError::NoClientsAvailable);
        }
        Ok(Self { strategy, pool })
    }

    /// Serialize every call through the shared client under `single`
    ///
    /// No effect for `round_robin`, where slots are not shared unless agents
    /// outnumber the pool.
    pub fn with_serialized_sharing(mut self) -> Self {
        if self.strategy == DistributionStrategy::Single
            && let Some(Some(shared)) = self.pool.first_mut()
        {
            let serialized: Arc<dyn ServiceClient> =
                Arc::new(SerializedClient::new(Arc::clone(shared)));
            *shared = serialized;
        }
        self
    }

    pub fn strategy(&self) -> DistributionStrategy {
        self.strategy
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Pool slot index an agent maps to
    pub fn slot_for(&self, agent: AgentId) -> usize {
        match self.strategy {
            DistributionStrategy::Single => 0,
            DistributionStrategy::RoundRobin => agent.index() % self.pool.len(),
        }
    }

    /// Client for `agent`, or `None` if its slot is empty
    pub fn resolve(&self, agent: AgentId) -> ClientSlot {
        self.pool[self.slot_for(agent)].clone()
    }

    /// Deterministic assignment for agents `0..agent_count`
    pub fn assignments(&self, agent_count: u32) -> Vec<(AgentId, ClientSlot)> {
        (0..agent_count)
            .map(AgentId::from)
            .map(|agent| (agent, self.resolve(agent)))
            .collect()
    }
}

impl fmt::Debug for ClientProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<String> = self
            .pool
            .iter()
            .map(|slot| match slot {
                Some(client) => client.describe(),
                None => "<missing>".to_string(),
            })
            .collect();
        f.debug_struct("ClientProvisioner")
            .field("strategy", &self.strategy)
            .field("pool", &slots)
            .finish()
    }
}

/// Wraps a client so at most one query runs through it at a time
pub struct SerializedClient {
    inner: Arc<dyn ServiceClient>,
    gate: Mutex<()>,
}

impl SerializedClient {
    pub fn new(inner: Arc<dyn ServiceClient>) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ServiceClient for SerializedClient {
    async fn execute(
        &self,
        ctx: &RunContext,
        namespace: &str,
        query: &str,
        allow_redirect: bool,
    ) -> Result<QueryResponse> {
        let _guard = self.gate.lock().await;
        self.inner
            .execute(ctx, namespace, query, allow_redirect)
            .await
    }

    fn describe(&self) -> String {
        format!("serialized({})", self.inner.describe())
    }
}
