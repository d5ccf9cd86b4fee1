//! Clients for external services.
//!
//! # Services
//!
//! - `order_api` - Remote order backend (order creation)

pub mod order_api;

pub use order_api::{OrderApiClient, OrderApiError};
