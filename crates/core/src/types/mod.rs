//! Core types for QuickCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod shipping;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use shipping::{ShippingField, ShippingInfo, ValidationError, is_plausible_email};
