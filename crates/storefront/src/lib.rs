//! QuickCart storefront library.
//!
//! Cart, checkout and order state for a small shop, plus the axum view
//! adapter that exposes it over HTTP. Exposed as a library so it can be
//! tested and driven from the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod order;
pub mod routes;
pub mod services;
pub mod shop;
pub mod state;
pub mod storage;
