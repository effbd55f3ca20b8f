//! Benchmark report assembly and output formatting

use crate::client::DistributionStrategy;
use crate::metrics::aggregate::AggregateMetrics;
use crate::metrics::collector::{Summary, as_millis};
use crate::result::{AgentResult, AgentResults};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Agents shown one per line before switching to a condensed summary
const MAX_AGENTS_IN_BREAKDOWN: usize = 10;

/// Everything observed about one benchmark run
#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub benchmark: String,
    pub client_type: DistributionStrategy,
    pub hosts: Vec<String>,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub aggregate: AggregateMetrics,
    pub agents: AgentResults,
}

impl BenchReport {
    pub fn new(
        benchmark: impl Into<String>,
        client_type: DistributionStrategy,
        hosts: Vec<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        agents: AgentResults,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            benchmark: benchmark.into(),
            client_type,
            hosts,
            elapsed,
            aggregate: AggregateMetrics::from_results(&agents),
            agents,
        }
    }

    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Print a human-readable report
    pub fn print(&self) {
        println!("\n📊 pibench Results");
        println!("═══════════════════════════════════════════════════════════════");

        println!("\n🔧 Run:");
        println!("   Run ID:           {}", self.run_id);
        println!("   Started:          {}", self.started_at.to_rfc3339());
        println!("   Benchmark:        {}", self.benchmark);
        println!("   Client Type:      {}", self.client_type);
        println!("   Hosts:            {}", self.hosts.join(", "));
        println!("   Agents:           {}", self.aggregate.agents);
        println!("   Elapsed:          {:.2}s", self.elapsed.as_secs_f64());

        self.print_overall();
        self.print_agent_breakdown();

        println!("═══════════════════════════════════════════════════════════════");
    }

    fn print_overall(&self) {
        let aggregate = &self.aggregate;

        println!("\n📈 Overall Results:");
        println!("   Queries:          {}", aggregate.total_queries);
        println!("   Agents OK:        {}", aggregate.succeeded);
        println!("   Agents Failed:    {}", aggregate.failed);
        if aggregate.cancelled > 0 {
            println!("   Agents Cancelled: {}", aggregate.cancelled);
        }
        println!("   Success Rate:     {:.2}%", aggregate.success_rate());

        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            println!(
                "   Queries/sec:      {:.2}",
                aggregate.total_queries as f64 / seconds
            );
        }

        if let (Some(min), Some(max), Some(mean)) = (aggregate.min, aggregate.max, aggregate.mean)
        {
            println!("\n🔄 Latency:");
            println!("   Mean:             {}", format_millis(mean));
            println!("   Min:              {}", format_millis(min));
            println!("   Max:              {}", format_millis(max));
        }
    }

    fn print_agent_breakdown(&self) {
        if self.agents.len() <= MAX_AGENTS_IN_BREAKDOWN {
            println!("\n👥 Per-Agent Breakdown:");
            for (agent, result) in &self.agents {
                println!("   Agent {}: {}", agent, describe(result));
            }
            return;
        }

        let failures: Vec<_> = self
            .agents
            .iter()
            .filter(|(_, result)| !result.is_success())
            .collect();

        println!(
            "\n👥 Agent Summary ({} agents, {} not successful):",
            self.agents.len(),
            failures.len()
        );
        for (agent, result) in failures.iter().take(MAX_AGENTS_IN_BREAKDOWN) {
            println!("   Agent {}: {}", agent, describe(result));
        }
        if failures.len() > MAX_AGENTS_IN_BREAKDOWN {
            println!(
                "   ... and {} more",
                failures.len() - MAX_AGENTS_IN_BREAKDOWN
            );
        }
    }
}

fn describe(result: &AgentResult) -> String {
    match result {
        AgentResult::Success(summary) => describe_summary(summary),
        AgentResult::Failed { error } => format!("❌ {}", error),
    }
}

fn describe_summary(summary: &Summary) -> String {
    match &summary.latency {
        None => "0 queries".to_string(),
        Some(latency) => format!(
            "{} queries, mean {}, p50 {}, p90 {}, p99 {}, max {}",
            summary.count,
            format_millis(latency.mean),
            format_millis(latency.p50),
            format_millis(latency.p90),
            format_millis(latency.p99),
            format_millis(latency.max),
        ),
    }
}

fn format_millis(duration: Duration) -> String {
    format!("{:.3}ms", duration.as_secs_f64() * 1_000.0)
}
