//! Benchmark workloads
//!
//! Each benchmark type implements [`BenchmarkWorkload`]. Workloads hold only
//! immutable parameters; the client is handed to `run` by the runner, so one
//! workload instance can safely serve many agents at once.

pub mod query;
pub mod random_set_bits;
pub mod set_bits;

pub use random_set_bits::RandomSetBits;
pub use set_bits::MultiDbSetBits;

use crate::client::ServiceClient;
use crate::common::{AgentId, RunContext};
use crate::constants::DEBUG_LOG_INTERVAL;
use crate::errors::{BenchError, Result};
use crate::metrics::StatsCollector;
use crate::result::AgentResult;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A parameterized, repeatable unit of synthetic traffic
#[async_trait]
pub trait BenchmarkWorkload: Send + Sync {
    /// Benchmark name as used on the command line
    fn name(&self) -> &'static str;

    /// Run every iteration for `agent` and report its outcome
    async fn run(
        &self,
        ctx: &RunContext,
        agent: AgentId,
        client: Option<&dyn ServiceClient>,
    ) -> AgentResult;
}

/// Builds the workload instance for each agent
pub trait WorkloadFactory: Send + Sync {
    fn build(&self, agent: AgentId) -> Arc<dyn BenchmarkWorkload>;
}

impl<F> WorkloadFactory for F
where
    F: Fn(AgentId) -> Arc<dyn BenchmarkWorkload> + Send + Sync,
{
    fn build(&self, agent: AgentId) -> Arc<dyn BenchmarkWorkload> {
        self(agent)
    }
}

/// Factory handing the same immutable workload to every agent
pub fn shared(workload: Arc<dyn BenchmarkWorkload>) -> impl WorkloadFactory {
    move |_agent: AgentId| Arc::clone(&workload)
}

/// Issue `iterations` sequential queries for one agent, timing each call
///
/// `next_query` maps an iteration number to the query text. Only the
/// `execute` call sits between the two timestamps. The first failure stops
/// the loop; samples recorded so far stay in `stats` for the caller to inspect.
pub(crate) async fn drive_queries<F>(
    ctx: &RunContext,
    agent: AgentId,
    client: &dyn ServiceClient,
    namespace: &str,
    iterations: i64,
    stats: &mut StatsCollector,
    mut next_query: F,
) -> Result<()>
where
    F: FnMut(i64) -> String + Send,
{
    let mut completed = 0u64;

    for n in 0..iterations {
        if ctx.is_cancelled() {
            return Err(BenchError::Cancelled { agent, completed });
        }

        let query = next_query(n);

        let start = Instant::now();
        let outcome = client.execute(ctx, namespace, &query, true).await;
        let end = Instant::now();

        if let Err(source) = outcome {
            if ctx.is_cancelled() {
                return Err(BenchError::Cancelled { agent, completed });
            }
            return Err(BenchError::QueryExecution {
                agent,
                iteration: n,
                source: Box::new(source),
            });
        }

        if let Err(e) = stats.add_between(start, end) {
            warn!("Agent {} dropped a latency sample: {}", agent, e);
        }

        completed += 1;
        if completed % DEBUG_LOG_INTERVAL == 0 {
            debug!("Agent {} completed {} queries", agent, completed);
        }
    }

    Ok(())
}

/// Missing-client check followed by the query loop
pub(crate) async fn run_with_stats<F>(
    ctx: &RunContext,
    agent: AgentId,
    client: Option<&dyn ServiceClient>,
    namespace: &str,
    iterations: i64,
    stats: &mut StatsCollector,
    next_query: F,
) -> Result<()>
where
    F: FnMut(i64) -> String + Send,
{
    let client = client.ok_or(BenchError::MissingClient { agent })?;
    drive_queries(ctx, agent, client, namespace, iterations, stats, next_query).await
}

/// Convert a finished loop into the agent's result, discarding partial samples on error
pub(crate) fn into_result(
    name: &str,
    agent: AgentId,
    outcome: Result<()>,
    stats: &StatsCollector,
) -> AgentResult {
    match outcome {
        Ok(()) => {
            info!("Agent {} completed {} ({} queries)", agent, name, stats.len());
            AgentResult::from(stats.summarize())
        }
        Err(e) if e.is_cancelled() => {
            info!("{}", e);
            AgentResult::failed(e)
        }
        Err(e) => {
            error!("{}", e);
            AgentResult::failed(e)
        }
    }
}
