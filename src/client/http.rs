//! HTTP client for Pilosa-style query endpoints

use crate::client::{QueryResponse, ServiceClient};
use crate::common::RunContext;
use crate::errors::{BenchError, ErrorContext, Result};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for one service host
///
/// Queries are `POST {host}/query?db={namespace}` with the query text as the
/// body. Safe to share between agents: both inner `reqwest::Client`s are
/// connection pools designed for concurrent use.
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    base_url: Url,
    http_client: reqwest::Client,
    no_redirect_client: reqwest::Client,
}

impl HttpServiceClient {
    pub fn new(host: &str, timeout: Duration, insecure: bool) -> Result<Self> {
        let mut base_url = Url::parse(&Self::normalize_host(host))
            .with_config_context(&format!("Invalid host '{}'", host))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .build()?;
        let no_redirect_client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            base_url,
            http_client,
            no_redirect_client,
        })
    }

    /// Bare `host:port` values get an `http://` scheme
    pub fn normalize_host(host: &str) -> String {
        let host = host.trim();
        if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn query_url(&self, namespace: &str) -> Result<Url> {
        let mut url = self.base_url.join("query")?;
        url.query_pairs_mut().append_pair("db", namespace);
        Ok(url)
    }

    fn decode(status: reqwest::StatusCode, body: &str) -> Result<QueryResponse> {
        let parsed = serde_json::from_str::<QueryResponse>(body);

        if !status.is_success() {
            let detail = match parsed {
                Ok(QueryResponse {
                    error: Some(error), ..
                }) => error,
                _ => body.trim().to_string(),
            };
            return Err(BenchError::Server(format!("HTTP {}: {}", status, detail)));
        }

        let response = parsed?;
        if let Some(error) = &response.error {
            return Err(BenchError::Server(error.clone()));
        }
        Ok(response)
    }
}

#[async_trait]
impl ServiceClient for HttpServiceClient {
    async fn execute(
        &self,
        ctx: &RunContext,
        namespace: &str,
        query: &str,
        allow_redirect: bool,
    ) -> Result<QueryResponse> {
        if ctx.is_cancelled() {
            return Err(BenchError::Transport("request cancelled".to_string()));
        }

        let url = self.query_url(namespace)?;
        let client = if allow_redirect {
            &self.http_client
        } else {
            &self.no_redirect_client
        };
        let request = client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(query.to_string());

        let response = tokio::select! {
            response = request.send() => response.with_transport_context("HTTP request failed")?,
            _ = ctx.cancelled() => {
                debug!("Request to {} abandoned after cancellation", self.base_url);
                return Err(BenchError::Transport("request cancelled".to_string()));
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .with_transport_context("Failed to read response body")?;

        Self::decode(status, &body)
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}
