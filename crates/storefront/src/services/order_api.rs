//! Remote order backend client.
//!
//! The backend exposes a single operation: `POST {base}/orders` with
//! `{ items, total, shipping }`. A success response may carry an `orderId`
//! (string or number). A failure response may carry `{ message }`, which is
//! shown to the user as is.

use quickcart_core::{OrderId, Price, ShippingInfo};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::checkout::CheckoutSnapshot;
use crate::config::OrderApiConfig;
use crate::order::Order;

/// Message used when the backend does not explain a failure.
const DEFAULT_FAILURE_MESSAGE: &str = "Order failed";

/// Errors that can occur when talking to the order backend.
#[derive(Debug, Error)]
pub enum OrderApiError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the order.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Success response could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured API token is not a valid header value.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),
}

impl OrderApiError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(_) | Self::Parse(_) | Self::InvalidToken(_) => {
                format!("{DEFAULT_FAILURE_MESSAGE}. Please try again.")
            }
        }
    }
}

/// Order creation request body.
#[derive(Debug, Serialize)]
pub struct CreateOrderRequest<'a> {
    pub items: &'a CheckoutSnapshot,
    pub total: Price,
    pub shipping: &'a ShippingInfo,
}

impl<'a> From<&'a Order> for CreateOrderRequest<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            items: &order.items,
            total: order.total,
            shipping: &order.shipping,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    #[serde(default)]
    order_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the remote order backend.
#[derive(Debug, Clone)]
pub struct OrderApiClient {
    client: reqwest::Client,
    orders_url: String,
}

impl OrderApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &OrderApiConfig) -> Result<Self, OrderApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| OrderApiError::InvalidToken(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            orders_url: orders_url(&config.base_url),
        })
    }

    /// Create a client with no token and no timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_base_url(base_url: Url) -> Result<Self, OrderApiError> {
        Self::new(&OrderApiConfig {
            base_url,
            token: None,
            timeout: None,
        })
    }

    /// Submit an order. Returns the backend's order id, if it sent one.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the backend answers with a
    /// non-success status, or a non-empty success body is not JSON.
    pub async fn create_order(&self, order: &Order) -> Result<Option<OrderId>, OrderApiError> {
        let body = CreateOrderRequest::from(order);
        let response = self.client.post(&self.orders_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            return Err(OrderApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        let parsed: CreateOrderResponse =
            serde_json::from_str(&text).map_err(|e| OrderApiError::Parse(e.to_string()))?;

        Ok(parsed.order_id.and_then(|id| match id {
            serde_json::Value::String(s) if !s.is_empty() => Some(OrderId::new(s)),
            serde_json::Value::Number(n) => Some(OrderId::new(n.to_string())),
            _ => None,
        }))
    }
}

fn orders_url(base_url: &Url) -> String {
    format!("{}/orders", base_url.as_str().trim_end_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_url_handles_trailing_slash() {
        let with = Url::parse("http://localhost:5000/api/").unwrap();
        let without = Url::parse("http://localhost:5000/api").unwrap();
        assert_eq!(orders_url(&with), "http://localhost:5000/api/orders");
        assert_eq!(orders_url(&without), "http://localhost:5000/api/orders");
    }

    #[test]
    fn test_user_message() {
        let err = OrderApiError::Api {
            status: 422,
            message: "Out of stock".to_string(),
        };
        assert_eq!(err.user_message(), "Out of stock");

        let err = OrderApiError::Parse("bad".to_string());
        assert_eq!(err.user_message(), "Order failed. Please try again.");
    }

    #[test]
    fn test_request_body_carries_shipping() {
        let items =
            CheckoutSnapshot::single_item(&crate::catalog::Catalog::default(), "1", 2).unwrap();
        let shipping = ShippingInfo {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Main St".to_string(),
            city: "Pune".to_string(),
            postal_code: "411001".to_string(),
        };
        let order = Order::build(items, &shipping, chrono::Utc::now()).unwrap();

        let body = serde_json::to_value(CreateOrderRequest::from(&order)).unwrap();
        assert_eq!(body["total"], "100");
        assert_eq!(body["items"][0]["quantity"], 2);
        assert_eq!(body["shipping"]["postalCode"], "411001");
        assert!(body.get("createdAt").is_none());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = OrderApiConfig {
            base_url: Url::parse("http://localhost:5000/api").unwrap(),
            token: Some(secrecy::SecretString::from("bad\ntoken")),
            timeout: None,
        };
        assert!(matches!(
            OrderApiClient::new(&config),
            Err(OrderApiError::InvalidToken(_))
        ));
    }
}
