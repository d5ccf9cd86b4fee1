//! Domain error taxonomy.

use quickcart_core::ValidationError;
use thiserror::Error;

use crate::services::OrderApiError;

/// Errors returned by cart, checkout and order operations.
///
/// Every variant is recoverable: the shop is left in a consistent state and
/// the caller shows the message to the user.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Referenced product is not in the catalog.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Quantity must be at least 1.
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    /// Checkout requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Shipping details or items failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Submit or cancel without a checkout in progress.
    #[error("No checkout in progress")]
    NoPendingCheckout,

    /// Another submission has not finished yet.
    #[error("Order submission already in progress")]
    SubmissionInProgress,

    /// The order backend rejected or never received the order.
    /// The order record is still saved locally.
    #[error("Order failed: {}", .0.user_message())]
    RemoteSubmission(#[from] OrderApiError),

    /// Login form incomplete.
    #[error("{0}")]
    InvalidLogin(&'static str),
}
