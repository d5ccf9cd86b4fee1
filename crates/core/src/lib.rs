//! QuickCart Core - Shared types library.
//!
//! This crate provides common types used across all QuickCart components:
//! - `storefront` - Cart, checkout and order state plus the HTTP view adapter
//! - `cli` - Command-line tools for inspecting persisted shop state
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and shipping details

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
