//! Order route handlers.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use quickcart_core::{CurrencyCode, OrderId, Price, ShippingInfo};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::order::Order;
use crate::routes::checkout::CheckoutLineView;
use crate::state::AppState;

/// Placed order display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: Option<OrderId>,
    pub items: Vec<CheckoutLineView>,
    pub total: Price,
    pub total_display: String,
    pub shipping: ShippingInfo,
    pub full_address: String,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    #[must_use]
    pub fn new(order: &Order, currency: CurrencyCode) -> Self {
        Self {
            order_id: order.order_id.clone(),
            items: order.items.lines().iter().map(CheckoutLineView::from).collect(),
            total: order.total,
            total_display: order.total.display(currency),
            shipping: order.shipping.clone(),
            full_address: order.shipping.full_address(),
            created_at: order.created_at,
        }
    }
}

async fn last_order_view(state: &AppState) -> Result<Json<OrderView>> {
    let order = state
        .shop()
        .lock()
        .await
        .last_order()
        .ok_or_else(|| AppError::NotFound("no order has been placed".to_string()))?;
    Ok(Json(OrderView::new(&order, state.config().currency)))
}

/// Show the most recent order after checkout.
#[instrument(skip(state))]
pub async fn confirmation(State(state): State<AppState>) -> Result<Json<OrderView>> {
    last_order_view(&state).await
}

/// Show the most recent order to a logged-in user.
#[instrument(skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<Json<OrderView>> {
    if !state.shop().lock().await.is_logged_in() {
        return Err(AppError::Unauthorized(
            "Please log in to view your order".to_string(),
        ));
    }
    last_order_view(&state).await
}
