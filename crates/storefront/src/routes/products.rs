//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use quickcart_core::{CurrencyCode, Price, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::Product;
use crate::error::{AppError, Result};
use crate::shop::ShopError;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub price_display: String,
    pub img: String,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            price_display: product.price.display(currency),
            img: product.img.clone(),
        }
    }
}

/// List every catalog product in catalog order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<ProductView>> {
    let currency = state.config().currency;
    let shop = state.shop().lock().await;
    let products = shop
        .catalog()
        .products()
        .iter()
        .map(|product| ProductView::new(product, currency))
        .collect();
    Json(products)
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ProductView>> {
    let currency = state.config().currency;
    let shop = state.shop().lock().await;
    let product = shop
        .catalog()
        .find(&id)
        .ok_or_else(|| AppError::from(ShopError::NotFound(id.clone())))?;
    Ok(Json(ProductView::new(product, currency)))
}
