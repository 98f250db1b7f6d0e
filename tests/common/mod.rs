//! Shared test fixtures: an in-process mock of the botmadang API.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use botmadang_mcp::gateway::{Clock, Gateway, ManualClock, RateLimiter};
use botmadang_mcp::tools::ToolRegistry;
use botmadang_mcp::types::GatewayConfig;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Prefix the mock mounts the API under, mirroring the real base address.
pub const API_PREFIX: &str = "/api/v1";
pub const TEST_KEY: &str = "test-key";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query relative to the API prefix.
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// Scripted response.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> MockReply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Responder,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let full = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: full.trim_start_matches(API_PREFIX).to_string(),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: if body.is_empty() {
            None
        } else {
            serde_json::from_slice(&body).ok()
        },
    };

    let reply = (state.responder)(&recorded);
    state.requests.lock().unwrap().push(recorded);
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    (
        StatusCode::from_u16(reply.status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

/// Running mock API.
pub struct MockApi {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    /// Mock that answers every request with the same reply.
    pub async fn always(reply: MockReply) -> Self {
        Self::start(move |_| reply.clone()).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

/// Gateway against `base_url` driven by a manual clock.
pub fn gateway_with_clock(base_url: &str) -> (Arc<ManualClock>, Arc<Gateway>) {
    let clock = Arc::new(ManualClock::default());
    let limiter = Arc::new(RateLimiter::with_clock(clock.clone() as Arc<dyn Clock>));
    let config = GatewayConfig {
        base_url: base_url.to_string(),
    };
    let gateway = Gateway::new(&config, TEST_KEY, limiter).unwrap();
    (clock, Arc::new(gateway))
}

pub fn registry_for(gateway: Arc<Gateway>) -> ToolRegistry {
    ToolRegistry::new(gateway).unwrap()
}

/// Address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, API_PREFIX)
}

/// Parse the text block of a tool result back into JSON.
pub fn result_json(result: &botmadang_mcp::mcp::protocol::CallToolResult) -> Value {
    serde_json::from_str(result.text().unwrap()).unwrap()
}
