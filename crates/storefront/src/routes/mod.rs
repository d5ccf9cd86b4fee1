//! HTTP route handlers for storefront.
//!
//! Handlers return JSON view state. Mutations that other parts of the page
//! care about carry an `HX-Trigger` header with JSON events; navigation after
//! a successful action is signalled with `HX-Redirect`.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart view
//! GET  /cart/count             - Cart count badge
//! POST /cart/add               - Add to cart (triggers cart-updated)
//! POST /cart/update            - Change quantity by delta
//! POST /cart/remove            - Remove line
//!
//! # Checkout
//! POST /checkout               - Snapshot the whole cart
//! POST /checkout/buy-now       - Snapshot a single product
//! GET  /checkout               - Pending snapshot and total
//! POST /checkout/cancel        - Discard the pending snapshot
//! POST /checkout/submit        - Place the order (redirects to confirmation)
//!
//! # Orders
//! GET  /order/confirmation     - Last order
//! GET  /order                  - Last order (requires login)
//!
//! # Notifications
//! GET  /notifications          - Unread count
//! POST /notifications/clear    - Reset the count
//!
//! # Auth
//! POST /auth/login             - Set the session login flag
//! POST /auth/logout            - Clear the session login flag
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod notifications;
pub mod order;
pub mod products;

use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::error::{HX_TRIGGER, trigger_header};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// HTMX response header requesting client-side navigation.
pub const HX_REDIRECT: &str = "HX-Redirect";

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::start))
        .route("/buy-now", post(checkout::buy_now))
        .route("/cancel", post(checkout::cancel))
        .route("/submit", post(checkout::submit))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(order::summary))
        .route("/confirmation", get(order::confirmation))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::show))
        .route("/clear", post(notifications::clear))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/order", order_routes())
        .nest("/notifications", notification_routes())
        .nest("/auth", auth_routes())
}

/// Build the complete application with request tracing.
///
/// The Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// HTMX Helpers
// =============================================================================

/// Attach `HX-Trigger` events to a response.
pub fn with_trigger(response: impl IntoResponse, events: &serde_json::Value) -> Response {
    let mut response = response.into_response();
    if let Some(value) = trigger_header(events) {
        response.headers_mut().insert(HX_TRIGGER, value);
    }
    response
}

/// Attach an `HX-Redirect` to a response.
pub fn with_redirect(response: impl IntoResponse, location: &'static str) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(HX_REDIRECT, HeaderValue::from_static(location));
    response
}
