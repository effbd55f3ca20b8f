//! Multi-database set-bits benchmark

use crate::client::ServiceClient;
use crate::common::{AgentId, RunContext};
use crate::constants::{DEFAULT_ITERATIONS, MULTI_DB_NAMESPACE_PREFIX, SET_BIT_FRAME};
use crate::errors::Result;
use crate::metrics::StatsCollector;
use crate::result::AgentResult;
use crate::workload::{BenchmarkWorkload, into_result, query, run_with_stats};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Sets bits with increasing bitmap and profile ids, one database per agent
///
/// Iteration `n` sets `(base_bitmap_id + n, base_profile_id + n)` in database
/// `multidb<agent>`, so concurrent agents never write to the same database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MultiDbSetBits {
    pub base_bitmap_id: i64,
    pub base_profile_id: i64,
    pub iterations: i64,
}

impl Default for MultiDbSetBits {
    fn default() -> Self {
        Self {
            base_bitmap_id: 0,
            base_profile_id: 0,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl MultiDbSetBits {
    pub const NAME: &'static str = "multi-db-set-bits";

    pub fn new(base_bitmap_id: i64, base_profile_id: i64, iterations: i64) -> Self {
        Self {
            base_bitmap_id,
            base_profile_id,
            iterations,
        }
    }

    /// Database an agent writes into
    pub fn namespace(agent: AgentId) -> String {
        format!("{}{}", MULTI_DB_NAMESPACE_PREFIX, agent)
    }

    /// Query issued on iteration `n`
    pub fn query(&self, n: i64) -> String {
        query::set_bit(
            self.base_bitmap_id.wrapping_add(n),
            SET_BIT_FRAME,
            self.base_profile_id.wrapping_add(n),
        )
    }

    /// Same loop as `run`, recording into a caller-owned collector
    pub async fn run_with_stats(
        &self,
        ctx: &RunContext,
        agent: AgentId,
        client: Option<&dyn ServiceClient>,
        stats: &mut StatsCollector,
    ) -> Result<()> {
        run_with_stats(
            ctx,
            agent,
            client,
            &Self::namespace(agent),
            self.iterations,
            stats,
            |n| self.query(n),
        )
        .await
    }
}

#[async_trait]
impl BenchmarkWorkload for MultiDbSetBits {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(
        &self,
        ctx: &RunContext,
        agent: AgentId,
        client: Option<&dyn ServiceClient>,
    ) -> AgentResult {
        info!(
            "Agent {} setting {} bits in {}",
            agent,
            self.iterations.max(0),
            Self::namespace(agent)
        );

        let mut stats = StatsCollector::new();
        let outcome = self.run_with_stats(ctx, agent, client, &mut stats).await;
        into_result(Self::NAME, agent, outcome, &stats)
    }
}
