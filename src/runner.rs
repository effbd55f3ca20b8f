//! Runs one workload per agent concurrently and collects their results

use crate::client::{ClientProvisioner, ClientSlot, DistributionStrategy};
use crate::common::{AgentId, RunContext};
use crate::constants::CANCEL_GRACE_PERIOD;
use crate::errors::{BenchError, Result};
use crate::result::{AgentResult, AgentResults};
use crate::workload::WorkloadFactory;

use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Spawns and coordinates benchmark agents
pub struct BenchmarkRunner {
    pool: Vec<ClientSlot>,
    serialize_shared: bool,
    cancel_grace: Duration,
}

impl BenchmarkRunner {
    pub fn new(pool: Vec<ClientSlot>) -> Self {
        Self {
            pool,
            serialize_shared: false,
            cancel_grace: CANCEL_GRACE_PERIOD,
        }
    }

    /// Serialize calls through the shared client under the `single` strategy
    pub fn serialize_shared(mut self, enabled: bool) -> Self {
        self.serialize_shared = enabled;
        self
    }

    /// How long agents get to wind down once the context is cancelled
    pub fn cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    /// Run `agent_count` agents and return exactly one result per agent index
    ///
    /// Setup errors are returned before any agent starts. Per-agent failures,
    /// including panics, only show up in that agent's entry.
    pub async fn run_all(
        &self,
        ctx: &RunContext,
        factory: &dyn WorkloadFactory,
        agent_count: u32,
        strategy: DistributionStrategy,
    ) -> Result<AgentResults> {
        let mut provisioner = ClientProvisioner::new(strategy, self.pool.clone())?;
        if self.serialize_shared {
            provisioner = provisioner.with_serialized_sharing();
        }

        info!(
            "Starting {} agents with '{}' client distribution over {} client slot(s)",
            agent_count,
            strategy,
            provisioner.pool_size()
        );

        let handles = self.spawn_all_agents(ctx, factory, &provisioner, agent_count);
        let results = self.wait_for_agents(ctx, handles).await;

        info!("All {} agents finished", results.len());
        Ok(results)
    }

    /// Spawn one task per agent and return their handles in index order
    fn spawn_all_agents(
        &self,
        ctx: &RunContext,
        factory: &dyn WorkloadFactory,
        provisioner: &ClientProvisioner,
        agent_count: u32,
    ) -> Vec<(AgentId, JoinHandle<AgentResult>)> {
        provisioner
            .assignments(agent_count)
            .into_iter()
            .map(|(agent, client)| {
                let workload = factory.build(agent);
                let ctx = ctx.clone();
                let handle = tokio::spawn(async move {
                    workload.run(&ctx, agent, client.as_deref()).await
                });
                (agent, handle)
            })
            .collect()
    }

    /// Wait for every agent, aborting stragglers once the cancel grace period lapses
    async fn wait_for_agents(
        &self,
        ctx: &RunContext,
        handles: Vec<(AgentId, JoinHandle<AgentResult>)>,
    ) -> AgentResults {
        let grace = self.cancel_grace;
        let grace_expired = async {
            ctx.cancelled().await;
            tokio::time::sleep(grace).await;
        };
        tokio::pin!(grace_expired);
        let mut expired = false;

        let mut results = AgentResults::new();
        for (agent, mut handle) in handles {
            if expired {
                handle.abort();
            }

            let joined = tokio::select! {
                joined = &mut handle => Some(joined),
                _ = &mut grace_expired, if !expired => None,
            };
            let joined = match joined {
                Some(joined) => joined,
                None => {
                    warn!(
                        "Agents still running {:?} after cancellation, aborting",
                        grace
                    );
                    expired = true;
                    handle.abort();
                    handle.await
                }
            };

            results.insert(agent, Self::into_agent_result(agent, joined));
        }
        results
    }

    fn into_agent_result(
        agent: AgentId,
        joined: std::result::Result<AgentResult, JoinError>,
    ) -> AgentResult {
        match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => AgentResult::failed(BenchError::Aborted { agent }),
            Err(e) => {
                error!("Agent {} task failed: {}", agent, e);
                AgentResult::failed(BenchError::execution(format!(
                    "agent {} task failed: {}",
                    agent, e
                )))
            }
        }
    }
}
