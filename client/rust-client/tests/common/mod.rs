#![allow(dead_code)]

use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use matgwiazda_client::{ApiClient, Credentials, MemorySessionStore, SessionStore};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Per-route hit counter shared with mock handlers.
#[derive(Clone, Default)]
pub struct Hits(Arc<Mutex<HashMap<String, usize>>>);

impl Hits {
    pub fn record(&self, route: &str) {
        *self
            .0
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_insert(0) += 1;
    }

    pub fn count(&self, route: &str) -> usize {
        self.0.lock().unwrap().get(route).copied().unwrap_or(0)
    }
}

/// Serves `routes` under `/api/v1` on an ephemeral port and returns the base URL.
pub async fn spawn_backend(routes: Router) -> String {
    let app = Router::new().nest("/api/v1", routes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v1", addr)
}

pub fn credentials(access: &str, refresh: Option<&str>, user_id: Option<&str>) -> Credentials {
    Credentials {
        access_token: Some(access.to_string()),
        refresh_token: refresh.map(str::to_string),
        user_id: user_id.map(str::to_string),
    }
}

pub fn client_with(base_url: &str, credentials: Credentials) -> (Arc<MemorySessionStore>, ApiClient) {
    client_with_timeout(base_url, credentials, Duration::from_secs(5))
}

pub fn client_with_timeout(
    base_url: &str,
    credentials: Credentials,
    timeout: Duration,
) -> (Arc<MemorySessionStore>, ApiClient) {
    let store = Arc::new(MemorySessionStore::new(credentials));
    let shared: Arc<dyn SessionStore> = store.clone();
    let client =
        ApiClient::new(base_url, shared, timeout).expect("Failed to build api client");
    (store, client)
}

pub fn bearer(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub fn header(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
