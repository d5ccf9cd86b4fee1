//! Checkout route handlers.
//!
//! Submission releases the shop lock while the order is sent to the remote
//! backend; the `loading` flag on the shop rejects overlapping submits. If the
//! request is dropped before the backend answers, a drop guard clears
//! the flag so the checkout can be retried or cancelled.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::Response,
};
use quickcart_core::{CurrencyCode, Price, ProductId, ShippingInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::checkout::{CheckoutSnapshot, SnapshotLine};
use crate::error::{Result, add_breadcrumb};
use crate::routes::order::OrderView;
use crate::routes::{with_redirect, with_trigger};
use crate::shop::{ShopError, SubmissionTicket};
use crate::state::AppState;

/// Checkout line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineView {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

/// Pending checkout display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub items: Vec<CheckoutLineView>,
    pub total: Price,
    pub total_display: String,
    pub item_count: u64,
    pub submitting: bool,
}

impl From<&SnapshotLine> for CheckoutLineView {
    fn from(line: &SnapshotLine) -> Self {
        Self {
            id: line.id.clone(),
            title: line.title.clone(),
            price: line.price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

impl CheckoutView {
    #[must_use]
    pub fn new(snapshot: &CheckoutSnapshot, submitting: bool, currency: CurrencyCode) -> Self {
        let total = snapshot.total();
        Self {
            items: snapshot.lines().iter().map(CheckoutLineView::from).collect(),
            total,
            total_display: total.display(currency),
            item_count: snapshot.item_count(),
            submitting,
        }
    }
}

/// Buy-now form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyNowForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Start checkout with the whole cart.
#[instrument(skip(state))]
pub async fn start(State(state): State<AppState>) -> Result<Response> {
    let mut shop = state.shop().lock().await;
    let snapshot = shop.checkout_cart()?;
    let view = CheckoutView::new(snapshot, false, state.config().currency);
    Ok(with_redirect(Json(view), "/checkout"))
}

/// Start checkout for a single product, leaving the cart alone.
#[instrument(skip(state))]
pub async fn buy_now(State(state): State<AppState>, Form(form): Form<BuyNowForm>) -> Result<Response> {
    let mut shop = state.shop().lock().await;
    let snapshot = shop.buy_now(&form.product_id, form.quantity.unwrap_or(1))?;
    let view = CheckoutView::new(snapshot, false, state.config().currency);
    Ok(with_redirect(Json(view), "/checkout"))
}

/// Show the pending checkout.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let shop = state.shop().lock().await;
    let snapshot = shop.pending_checkout().ok_or(ShopError::NoPendingCheckout)?;
    Ok(Json(CheckoutView::new(
        snapshot,
        shop.is_submitting(),
        state.config().currency,
    )))
}

/// Discard the pending checkout and go back to the cart.
#[instrument(skip(state))]
pub async fn cancel(State(state): State<AppState>) -> Result<Response> {
    state.shop().lock().await.cancel_checkout()?;
    Ok(with_redirect(StatusCode::NO_CONTENT, "/cart"))
}

/// Abandons an in-flight submission when dropped before being disarmed.
struct SubmissionGuard {
    state: AppState,
    ticket: Option<SubmissionTicket>,
}

impl SubmissionGuard {
    const fn new(state: AppState, ticket: Option<SubmissionTicket>) -> Self {
        Self { state, ticket }
    }

    const fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };

        if let Ok(mut shop) = self.state.shop().try_lock() {
            shop.abandon_submission(ticket);
            return;
        }

        let state = self.state.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state.shop().lock().await.abandon_submission(ticket);
                });
            }
            Err(e) => tracing::error!(error = %e, "Cannot release abandoned submission"),
        }
    }
}

/// Place the order for the pending checkout.
///
/// On success the cart is cleared and the client is redirected to the
/// confirmation page. On a remote failure the order stays saved locally and
/// the checkout remains open for a retry.
#[instrument(skip(state, shipping))]
pub async fn submit(State(state): State<AppState>, Form(shipping): Form<ShippingInfo>) -> Result<Response> {
    let (order, ticket) = {
        let mut shop = state.shop().lock().await;
        let order = shop.begin_submission(&shipping)?;
        (order, shop.current_submission())
    };
    let mut guard = SubmissionGuard::new(state.clone(), ticket);

    let total = order.total.to_string();
    add_breadcrumb("checkout", "Order submitted", &[("total", total.as_str())]);

    let outcome = match state.order_api() {
        Some(client) => client.create_order(&order).await,
        None => Ok(None),
    };
    let order = {
        let mut shop = state.shop().lock().await;
        guard.disarm();
        shop.complete_submission(order, outcome)?
    };

    let view = OrderView::new(&order, state.config().currency);
    let response = with_redirect(Json(view), "/order/confirmation");
    Ok(with_trigger(
        response,
        &json!({ "cart-updated": { "count": 0 }, "show-toast": "Order placed" }),
    ))
}
