//! Random set-bits benchmark

use crate::client::ServiceClient;
use crate::common::{AgentId, RunContext};
use crate::constants::{DEFAULT_ID_RANGE, DEFAULT_ITERATIONS, DEFAULT_RANDOM_DB, SET_BIT_FRAME};
use crate::errors::Result;
use crate::metrics::StatsCollector;
use crate::result::AgentResult;
use crate::workload::{BenchmarkWorkload, into_result, query, run_with_stats};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

/// Sets bits at random coordinates in one shared database
///
/// Bitmap ids fall in `[base_bitmap_id, base_bitmap_id + bitmap_id_range)`,
/// profile ids likewise. Each agent seeds its generator with `seed + agent`,
/// so a run is reproducible for a given seed and agent count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomSetBits {
    pub base_bitmap_id: i64,
    pub bitmap_id_range: i64,
    pub base_profile_id: i64,
    pub profile_id_range: i64,
    pub iterations: i64,
    pub seed: u64,
    pub db: String,
}

impl Default for RandomSetBits {
    fn default() -> Self {
        Self {
            base_bitmap_id: 0,
            bitmap_id_range: DEFAULT_ID_RANGE,
            base_profile_id: 0,
            profile_id_range: DEFAULT_ID_RANGE,
            iterations: DEFAULT_ITERATIONS,
            seed: 1,
            db: DEFAULT_RANDOM_DB.to_string(),
        }
    }
}

impl RandomSetBits {
    pub const NAME: &'static str = "random-set-bits";

    fn rng_for(&self, agent: AgentId) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(u64::from(agent.get())))
    }

    fn next_query(&self, rng: &mut StdRng) -> String {
        let bitmap_id = self
            .base_bitmap_id
            .wrapping_add(rng.random_range(0..self.bitmap_id_range.max(1)));
        let profile_id = self
            .base_profile_id
            .wrapping_add(rng.random_range(0..self.profile_id_range.max(1)));
        query::set_bit(bitmap_id, SET_BIT_FRAME, profile_id)
    }

    /// Same loop as `run`, recording into a caller-owned collector
    pub async fn run_with_stats(
        &self,
        ctx: &RunContext,
        agent: AgentId,
        client: Option<&dyn ServiceClient>,
        stats: &mut StatsCollector,
    ) -> Result<()> {
        let mut rng = self.rng_for(agent);
        run_with_stats(
            ctx,
            agent,
            client,
            &self.db,
            self.iterations,
            stats,
            |_| self.next_query(&mut rng),
        )
        .await
    }
}

#[async_trait]
impl BenchmarkWorkload for RandomSetBits {
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
            "Agent {} setting {} random bits in {}",
            agent,
            self.iterations.max(0),
            self.db
        );

        let mut stats = StatsCollector::new();
        let outcome = self.run_with_stats(ctx, agent, client, &mut stats).await;
        into_result(Self::NAME, agent, outcome, &stats)
    }
}
