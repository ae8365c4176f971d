// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{http::Uri, routing::post, Json};
use serde_json::Value;

use crate::client::{ApiClient, ClientOptions, Credentials};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn hits(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn test_credentials() -> Credentials {
    Credentials::new("client-test", "secret-test").expect("credentials")
}

pub fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(test_credentials(), ClientOptions::for_host(&format!("http://{}", addr))).expect("api client")
}

/// `POST /oauth/token` issuing `tok-1`, `tok-2`, ... and counting calls.
pub fn token_router(calls: Arc<AtomicUsize>, expires_in: Option<u64>) -> Router {
    Router::new().route(
        "/oauth/token",
        post(move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let mut body = json!({ "access_token": format!("tok-{}", n), "token_type": "Bearer" });
                if let Some(expires_in) = expires_in {
                    body["expires_in"] = json!(expires_in);
                }
                Json(body)
            }
        }),
    )
}

/// Mock API: token endpoint plus a fallback that counts calls and echoes the
/// request target as `{"path": ..., "query": ..., "status": "paid"}`.
pub struct EchoApi {
    pub addr: SocketAddr,
    pub token_calls: Arc<AtomicUsize>,
    pub api_calls: Arc<AtomicUsize>,
    _handle: JoinHandle<()>,
}

impl EchoApi {
    pub async fn start() -> Self {
        let token_calls = counter();
        let api_calls = counter();
        let calls = api_calls.clone();
        let router = token_router(token_calls.clone(), Some(3600)).fallback(move |uri: Uri| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "path": uri.path(),
                    "query": uri.query().unwrap_or(""),
                    "status": "paid"
                }))
            }
        });
        let (handle, addr) = spawn_axum(router).await;
        Self { addr, token_calls, api_calls, _handle: handle }
    }

    pub fn client(&self) -> ApiClient {
        client_for(self.addr)
    }

    /// Total HTTP calls seen, token endpoint included.
    pub fn total_calls(&self) -> usize {
        hits(&self.token_calls) + hits(&self.api_calls)
    }
}

pub fn query_of(response: &Value) -> &str {
    response["query"].as_str().unwrap_or_default()
}
