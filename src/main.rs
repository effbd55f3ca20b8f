use pibench::client::build_pool;
use pibench::config::Config;
use pibench::errors::{BenchError, Result};
use pibench::metrics::BenchReport;
use pibench::workload;
use pibench::{BenchmarkRunner, CancelHandle, RunContext};

use chrono::Utc;
use std::process;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    // Parse and validate configuration before logging exists
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        error!("Benchmark failed: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run(config: Config) -> Result<()> {
    info!("pibench {}", env!("CARGO_PKG_VERSION"));

    if !config.output.json {
        config.print_summary();
    }

    let pool = build_pool(
        &config.target.hosts,
        config.target.request_timeout,
        config.target.insecure,
    );
    let (cancel, ctx) = RunContext::new();
    setup_signal_handler(cancel.clone());
    if let Some(run_timeout) = config.agents.run_timeout {
        setup_run_deadline(cancel.clone(), run_timeout);
    }

    let runner = BenchmarkRunner::new(pool).serialize_shared(config.agents.serialize_shared);
    let factory = workload::shared(config.workload());

    let started_at = Utc::now();
    let start = Instant::now();
    let results = runner
        .run_all(&ctx, &factory, config.agents.count, config.agents.client_type)
        .await?;

    let report = BenchReport::new(
        config.benchmark_name(),
        config.agents.client_type,
        config.target.hosts.clone(),
        started_at,
        start.elapsed(),
        results,
    );

    if config.output.json {
        println!("{}", report.to_json()?);
    } else {
        report.print();
    }

    if report.aggregate.all_succeeded() {
        info!("Benchmark completed successfully");
        Ok(())
    } else {
        Err(BenchError::execution(format!(
            "{} of {} agents did not complete",
            report.aggregate.agents - report.aggregate.succeeded,
            report.aggregate.agents
        )))
    }
}

/// Cancel the run on Ctrl+C
fn setup_signal_handler(cancel: CancelHandle) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
            return;
        }
        warn!("Received Ctrl+C, cancelling agents...");
        cancel.cancel();
    });
}

/// Cancel the run once the deadline passes
fn setup_run_deadline(cancel: CancelHandle, run_timeout: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(run_timeout).await;
        if !cancel.is_cancelled() {
            warn!("Run timeout of {:?} reached, cancelling agents...", run_timeout);
            cancel.cancel();
        }
    });
}

/// Initialize logging based on configuration
fn init_logging(config: &Config) {
    let level = if config.output.verbose {
        "debug"
    } else {
        "info"
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    format!("pibench={}", level)
                        .parse()
                        .expect("Invalid filter directive"),
                )
                .add_directive("reqwest=warn".parse().expect("Invalid filter directive"))
                .add_directive("hyper=warn".parse().expect("Invalid filter directive")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    if config.output.verbose {
        info!("Verbose logging enabled");
    }
}
