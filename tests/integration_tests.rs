mod common;

use common::MockServer;
use pibench::client::{HttpServiceClient, build_pool};
use pibench::workload::{self, MultiDbSetBits};
use pibench::{
    AgentId, BenchError, BenchmarkRunner, BenchmarkWorkload, CancelHandle, DistributionStrategy,
    RunContext, ServiceClient,
};

use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::task::JoinHandle;

fn http_client(server: &MockServer) -> HttpServiceClient {
    HttpServiceClient::new(&server.host(), Duration::from_secs(5), false).unwrap()
}

#[tokio::test]
async fn test_http_client_posts_query() {
    let server = MockServer::ok().await;
    let client = http_client(&server);
    let (_cancel, ctx) = RunContext::new();

    let response = client
        .execute(&ctx, "multidb0", "SetBit(1, 'frame.n', 2)", true)
        .await
        .unwrap();

    assert_eq!(response.results, vec![serde_json::Value::Bool(true)]);
    let recorded = server.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].target, "/query?db=multidb0");
    assert_eq!(recorded[0].body, "SetBit(1, 'frame.n', 2)");
}

#[tokio::test]
async fn test_http_client_reports_server_errors() {
    let server = MockServer::start(|_| (500, r#"{"error":"index not found"}"#.to_string())).await;
    let client = http_client(&server);
    let (_cancel, ctx) = RunContext::new();

    let err = client
        .execute(&ctx, "multidb0", "SetBit(1, 'frame.n', 2)", true)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Server(ref m) if m.contains("index not found")));
}

#[tokio::test]
async fn test_http_client_refuses_after_cancel() {
    let server = MockServer::ok().await;
    let client = http_client(&server);
    let (cancel, ctx) = RunContext::new();
    cancel.cancel();

    let err = client
        .execute(&ctx, "multidb0", "SetBit(0, 'frame.n', 0)", true)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Transport(_)));
    assert!(server.recorded().is_empty());
}

/// Cancel as soon as the server has seen a request, leaving it in flight
fn cancel_once_request_arrives(server: &MockServer, cancel: CancelHandle) -> JoinHandle<()> {
    let requests = server.requests.clone();
    tokio::spawn(async move {
        loop {
            let seen = !requests.lock().unwrap().is_empty();
            if seen {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();
    })
}

#[tokio::test]
async fn test_http_client_abandons_in_flight_request_on_cancel() {
    let server = MockServer::stalled().await;
    let client = HttpServiceClient::new(&server.host(), Duration::from_secs(30), false).unwrap();
    let (cancel, ctx) = RunContext::new();
    let canceller = cancel_once_request_arrives(&server, cancel);

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        client.execute(&ctx, "multidb0", "SetBit(0, 'frame.n', 0)", true),
    )
    .await
    .expect("cancellation should interrupt the pending request")
    .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, BenchError::Transport(ref m) if m.contains("cancelled")));
    assert_eq!(server.recorded().len(), 1);
}

#[tokio::test]
async fn test_agent_cancelled_while_request_in_flight() {
    let server = MockServer::stalled().await;
    let client = HttpServiceClient::new(&server.host(), Duration::from_secs(30), false).unwrap();
    let (cancel, ctx) = RunContext::new();
    let canceller = cancel_once_request_arrives(&server, cancel);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        MultiDbSetBits::new(0, 0, 100).run(&ctx, AgentId::new(0), Some(&client)),
    )
    .await
    .expect("agent should stop once cancelled");
    canceller.await.unwrap();

    assert!(result.is_cancelled());
    assert!(matches!(
        result.error(),
        Some(BenchError::Cancelled { completed: 0, .. })
    ));
}

#[tokio::test]
async fn test_round_robin_spreads_agents_over_hosts() {
    let first = MockServer::ok().await;
    let second = MockServer::ok().await;
    let pool = build_pool(
        &[first.host(), second.host()],
        Duration::from_secs(5),
        false,
    );
    let runner = BenchmarkRunner::new(pool);
    let (_cancel, ctx) = RunContext::new();
    let factory = workload::shared(Arc::new(MultiDbSetBits::new(100, 200, 3)));

    let results = runner
        .run_all(&ctx, &factory, 4, DistributionStrategy::RoundRobin)
        .await
        .unwrap();

    assert!(results.values().all(|r| r.summary().map(|s| s.count) == Some(3)));

    let dbs = |server: &MockServer| {
        let mut dbs: Vec<_> = server.recorded().into_iter().map(|r| r.target).collect();
        dbs.sort();
        dbs.dedup();
        dbs
    };
    assert_eq!(dbs(&first), ["/query?db=multidb0", "/query?db=multidb2"]);
    assert_eq!(dbs(&second), ["/query?db=multidb1", "/query?db=multidb3"]);
}

#[tokio::test]
async fn test_unreachable_host_fails_only_its_agents() {
    let server = MockServer::ok().await;
    // nothing listens on the discard port of localhost in the test environment
    let pool = build_pool(
        &[server.host(), "http://127.0.0.1:9".to_string()],
        Duration::from_secs(2),
        false,
    );
    let runner = BenchmarkRunner::new(pool);
    let (_cancel, ctx) = RunContext::new();
    let factory = workload::shared(Arc::new(MultiDbSetBits::new(0, 0, 2)));

    let results = runner
        .run_all(&ctx, &factory, 2, DistributionStrategy::RoundRobin)
        .await
        .unwrap();

    assert!(results[&AgentId::new(0)].is_success());
    assert!(matches!(
        results[&AgentId::new(1)].error(),
        Some(BenchError::QueryExecution { iteration: 0, .. })
    ));
}

#[tokio::test]
async fn test_pibench_cli_json_report() {
    let server = MockServer::ok().await;
    let host = server.host();

    let output = Command::new(env!("CARGO_BIN_EXE_pibench"))
        .args([
            "-H",
            host.as_str(),
            "-a",
            "2",
            "--json",
            "multi-db-set-bits",
            "--iterations",
            "3",
            "--base-bitmap-id",
            "10",
        ])
        .output()
        .await
        .expect("Failed to execute pibench");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nSTDOUT: {}\nSTDERR: {}",
        output.status.code(),
        stdout,
        stderr
    );

    let report: serde_json::Value = serde_json::from_str(&stdout).expect("JSON report on stdout");
    assert_eq!(report["benchmark"], "multi-db-set-bits");
    assert_eq!(report["client_type"], "single");
    assert_eq!(report["aggregate"]["succeeded"], 2);
    assert_eq!(report["aggregate"]["total_queries"], 6);
    assert_eq!(report["agents"]["0"]["count"], 3);
    assert_eq!(report["agents"]["1"]["count"], 3);

    let bodies: Vec<_> = server.recorded().into_iter().map(|r| r.body).collect();
    assert_eq!(bodies.len(), 6);
    assert!(bodies.contains(&"SetBit(12, 'frame.n', 2)".to_string()));
}

#[tokio::test]
async fn test_pibench_cli_rejects_unknown_client_type() {
    let output = Command::new(env!("CARGO_BIN_EXE_pibench"))
        .args(["multi-db-set-bits", "--client-type", "broadcast"])
        .output()
        .await
        .expect("Failed to execute pibench");

    assert!(!output.status.success());
}
