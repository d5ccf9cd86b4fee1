//! Integration test support for QuickCart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickcart-integration-tests
//! ```
//!
//! No external services are needed. [`TestContext`] drives the storefront
//! router in-process over a temporary data directory, and
//! [`MockOrderBackend`] serves `POST /api/orders` on an ephemeral local port.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart, checkout, order and session routes
//! - `order_api` - Submission against the mock order backend
//! - `cart_properties` - Property tests for the cart and snapshot model

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
    routing::post,
};
use quickcart_storefront::catalog::Catalog;
use quickcart_storefront::config::StorefrontConfig;
use quickcart_storefront::routes;
use quickcart_storefront::services::OrderApiClient;
use quickcart_storefront::shop::Shop;
use quickcart_storefront::state::AppState;
use quickcart_storefront::storage::{FileStorage, MemoryStorage};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

/// Largest response body the helpers will read.
const BODY_LIMIT: usize = 1024 * 1024;

/// A storefront over a fresh temporary data directory.
pub struct TestContext {
    pub state: AppState,
    pub data_dir: TempDir,
}

impl TestContext {
    /// Storefront with the built-in catalog and no order backend.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Storefront that sends orders to `base_url`.
    #[must_use]
    pub fn with_order_api(base_url: Url) -> Self {
        Self::build(Some(base_url))
    }

    fn build(base_url: Option<Url>) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = Self::state_for(&data_dir, base_url);
        Self { state, data_dir }
    }

    fn state_for(data_dir: &TempDir, base_url: Option<Url>) -> AppState {
        let storage = FileStorage::open(data_dir.path()).expect("Failed to open storage");
        let shop = Shop::open(
            Arc::new(Catalog::default()),
            Arc::new(storage),
            Arc::new(MemoryStorage::new()),
        );
        let order_api = base_url
            .map(|url| OrderApiClient::with_base_url(url).expect("Failed to create order client"));
        let config = StorefrontConfig {
            data_dir: data_dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        };
        AppState::new(config, shop, order_api)
    }

    /// Simulate a process restart: a new shop over the same data directory.
    #[must_use]
    pub fn restart(self) -> Self {
        let state = Self::state_for(&self.data_dir, None);
        Self {
            state,
            data_dir: self.data_dir,
        }
    }

    /// The full application router.
    #[must_use]
    pub fn app(&self) -> Router {
        routes::app(self.state.clone())
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// POST a form-encoded body.
    pub async fn post(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn send(&self, method: Method, uri: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");

        let response = self.app().oneshot(request).await.expect("Router failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A collected router response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    /// Parsed JSON body, or `Null` if the body is not JSON.
    pub body: Value,
}

impl TestResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parsed `HX-Trigger` events.
    #[must_use]
    pub fn trigger(&self) -> Option<Value> {
        self.header("HX-Trigger")
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// The `{"error": ...}` message of a failed response.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.body["error"].as_str()
    }
}

/// Shipping form fields for a complete, valid order.
#[must_use]
pub fn shipping_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Asha Rao"),
        ("email", "asha@example.com"),
        ("phone", "9876543210"),
        ("address", "12 Main St"),
        ("city", "Pune"),
        ("postalCode", "411001"),
    ]
}

/// An order backend on an ephemeral port answering every order with a
/// fixed status and body.
pub struct MockOrderBackend {
    pub base_url: Url,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockOrderBackend {
    /// Start the backend. It runs until the test's runtime shuts down.
    pub async fn start(status: StatusCode, body: &'static str) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        let app = Router::new().route(
            "/api/orders",
            post(move |Json(order): Json<Value>| {
                let log = Arc::clone(&log);
                async move {
                    log.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(order);
                    (status, body)
                }
            }),
        );

        Self {
            base_url: serve(app).await,
            received,
        }
    }

    /// Start a backend that records each order and never answers.
    pub async fn hanging() -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        let app = Router::new().route(
            "/api/orders",
            post(move |Json(order): Json<Value>| {
                let log = Arc::clone(&log);
                async move {
                    log.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(order);
                    std::future::pending::<StatusCode>().await
                }
            }),
        );

        Self {
            base_url: serve(app).await,
            received,
        }
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn received(&self) -> Vec<Value> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Listener has no address");
    drop(listener);
    api_url(addr)
}

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    api_url(addr)
}

fn api_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}/api")).expect("Invalid mock URL")
}
