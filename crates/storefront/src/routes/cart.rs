//! Cart route handlers.
//!
//! Every mutation returns the full cart view and an `HX-Trigger` header so
//! the count badge and toast can update without a page reload:
//!
//! ```json
//! {"cart-updated": {"count": 3}, "show-toast": "Added Shoe to cart"}
//! ```

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use quickcart_core::{CurrencyCode, Price, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::cart::{Cart, CartLine};
use crate::error::Result;
use crate::routes::with_trigger;
use crate::state::AppState;

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: ProductId,
    pub title: String,
    pub img: String,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
    pub line_total_display: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Price,
    pub subtotal_display: String,
    pub item_count: u64,
    pub notifications: u32,
}

impl CartItemView {
    fn new(line: &CartLine, currency: CurrencyCode) -> Self {
        let product = line.product();
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            img: product.img.clone(),
            quantity: line.quantity(),
            price: product.price,
            line_total: line.line_total(),
            line_total_display: line.line_total().display(currency),
        }
    }
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, notifications: u32, currency: CurrencyCode) -> Self {
        let subtotal = cart.subtotal();
        Self {
            items: cart
                .lines()
                .map(|line| CartItemView::new(line, currency))
                .collect(),
            subtotal,
            subtotal_display: subtotal.display(currency),
            item_count: cart.item_count(),
            notifications,
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: u64,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartForm {
    pub product_id: String,
    pub delta: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart view wrapped with the `cart-updated` event and an optional toast.
fn updated(view: CartView, toast: Option<String>) -> Response {
    let mut events = json!({ "cart-updated": { "count": view.item_count } });
    if let Some(toast) = toast {
        events["show-toast"] = json!(toast);
    }
    with_trigger(Json(view), &events)
}

/// Display cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    let shop = state.shop().lock().await;
    Json(CartView::new(
        shop.cart(),
        shop.notifications(),
        state.config().currency,
    ))
}

/// Add item to cart.
///
/// Quantity defaults to 1.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let mut shop = state.shop().lock().await;
    shop.add_to_cart(&form.product_id, form.quantity.unwrap_or(1))?;

    let title = shop
        .cart()
        .get(&form.product_id)
        .map(|line| line.product().title.clone())
        .unwrap_or_default();
    let view = CartView::new(shop.cart(), shop.notifications(), state.config().currency);
    Ok(updated(view, Some(format!("Added {title} to cart"))))
}

/// Change a line's quantity by a signed delta.
///
/// A line that reaches zero is removed. Unknown products are ignored.
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Response {
    let mut shop = state.shop().lock().await;
    let existed = shop.cart().get(&form.product_id).is_some();
    let remaining = shop.change_quantity(&form.product_id, form.delta);

    let toast = (existed && remaining.is_none()).then(|| "Removed from cart".to_string());
    let view = CartView::new(shop.cart(), shop.notifications(), state.config().currency);
    updated(view, toast)
}

/// Remove item from cart.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut shop = state.shop().lock().await;
    let removed = shop.remove_from_cart(&form.product_id);

    let view = CartView::new(shop.cart(), shop.notifications(), state.config().currency);
    updated(view, removed.then(|| "Removed from cart".to_string()))
}

/// Get cart count badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.shop().lock().await.cart().item_count();
    Json(CartCountView { count })
}
