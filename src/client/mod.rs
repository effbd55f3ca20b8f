//! Service client abstractions
//!
//! - The `ServiceClient` capability every workload executes queries through
//! - An HTTP implementation for Pilosa-style query endpoints
//! - The provisioner that assigns clients to agents

pub mod http;
pub mod provisioner;

// Re-export public types for easier access
pub use http::HttpServiceClient;
pub use provisioner::{ClientProvisioner, ClientSlot, DistributionStrategy, SerializedClient};

use crate::common::RunContext;
use crate::errors::Result;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Executes single queries against the service
///
/// Implementations must be safe to call concurrently through a shared
/// reference: under the `single` distribution strategy one instance serves
/// every agent at once. An implementation that cannot guarantee this should
/// be wrapped in [`SerializedClient`] before it is shared.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// Run `query` against `namespace`, returning the decoded response
    async fn execute(
        &self,
        ctx: &RunContext,
        namespace: &str,
        query: &str,
        allow_redirect: bool,
    ) -> Result<QueryResponse>;

    /// Human-readable identity used in logs
    fn describe(&self) -> String {
        "service client".to_string()
    }
}

/// Decoded query response body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One HTTP client slot per host; a host whose client cannot be built leaves an empty slot
pub fn build_pool(hosts: &[String], timeout: Duration, insecure: bool) -> Vec<ClientSlot> {
    hosts
        .iter()
        .map(|host| match HttpServiceClient::new(host, timeout, insecure) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn ServiceClient>),
            Err(e) => {
                warn!("Skipping host '{}': {}", host, e);
                None
            }
        })
        .collect()
}
