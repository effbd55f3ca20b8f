#![allow(dead_code)]

use async_trait::async_trait;
use pibench::client::{ClientSlot, QueryResponse};
use pibench::{BenchError, CancelHandle, RunContext, ServiceClient};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// In-memory client that records every query and can fail or cancel on cue
#[derive(Default)]
pub struct FakeClient {
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail_on_call: Option<usize>,
    pub cancel_after: Option<(usize, CancelHandle)>,
}

impl FakeClient {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(call: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_on_call: Some(call),
            ..Default::default()
        })
    }

    pub fn cancelling_after(calls: usize, handle: CancelHandle) -> Arc<Self> {
        Arc::new(Self {
            cancel_after: Some((calls, handle)),
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, query)| query.clone())
            .collect()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(namespace, _)| namespace.clone())
            .collect()
    }
}

#[async_trait]
impl ServiceClient for FakeClient {
    async fn execute(
        &self,
        _ctx: &RunContext,
        namespace: &str,
        query: &str,
        _allow_redirect: bool,
    ) -> pibench::Result<QueryResponse> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((namespace.to_string(), query.to_string()));
            calls.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(BenchError::Server(format!("injected failure on call {}", call)));
        }
        if let Some((after, handle)) = &self.cancel_after
            && call + 1 == *after
        {
            handle.cancel();
        }
        Ok(QueryResponse::default())
    }
}

pub fn slot(client: &Arc<FakeClient>) -> ClientSlot {
    Some(client.clone() as Arc<dyn ServiceClient>)
}

/// One request as seen by [`MockServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub target: String,
    pub body: String,
}

type Responder = fn(&RecordedRequest) -> (u16, String);

/// Minimal HTTP/1.1 server answering every request through `responder`
pub struct MockServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub connections: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start(responder: Responder) -> Self {
        Self::spawn(Some(responder)).await
    }

    /// Records requests but never answers them
    pub async fn stalled() -> Self {
        Self::spawn(None).await
    }

    async fn spawn(responder: Option<Responder>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let accepted_requests = requests.clone();
        let accepted_connections = connections.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepted_connections.fetch_add(1, Ordering::SeqCst);
                let requests = accepted_requests.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, requests, responder).await;
                });
            }
        });

        Self {
            addr,
            requests,
            connections,
        }
    }

    /// Always answers `{"results":[true]}`
    pub async fn ok() -> Self {
        Self::start(|_| (200, r#"{"results":[true]}"#.to_string())).await
    }

    pub fn host(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Option<Responder>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let header_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let target = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or_default()
            .to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let body =
            String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();
        buf.drain(..header_end + content_length);

        let request = RecordedRequest { target, body };
        let Some(responder) = responder else {
            requests.lock().unwrap().push(request);
            std::future::pending::<()>().await;
            return Ok(());
        };
        let (status, payload) = responder(&request);
        requests.lock().unwrap().push(request);

        let reason = match status {
            200 => "OK",
            400 => "Bad Request",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            status,
            reason,
            payload.len(),
            payload
        );
        stream.write_all(response.as_bytes()).await?;
    }
}
