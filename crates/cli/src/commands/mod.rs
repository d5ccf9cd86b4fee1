//! CLI command implementations.
//!
//! Commands write their output to the given writer so they can be tested
//! without capturing stdout.

pub mod cart;
pub mod catalog;
pub mod order;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quickcart_core::CurrencyCode;
use quickcart_storefront::catalog::{Catalog, CatalogError};
use quickcart_storefront::config::ConfigError;
use quickcart_storefront::services::OrderApiError;
use quickcart_storefront::shop::Shop;
use quickcart_storefront::storage::{FileStorage, MemoryStorage, StorageError};
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    OrderApi(#[from] OrderApiError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("no order has been placed")]
    NoOrder,

    #[error("ORDER_API_URL is not set")]
    NoOrderApi,
}

/// Where the storefront keeps its state.
#[derive(Debug, Clone, Args)]
pub struct ShopArgs {
    /// Directory holding the persisted cart and last order
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Catalog file; the built-in catalog is used when unset
    #[arg(long, env = "STOREFRONT_CATALOG_PATH")]
    pub catalog: Option<PathBuf>,

    /// Currency used when printing prices
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "INR")]
    pub currency: CurrencyCode,
}

impl ShopArgs {
    /// Load the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file is unreadable or invalid.
    pub fn load_catalog(&self) -> Result<Catalog, CliError> {
        Ok(match &self.catalog {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::default(),
        })
    }

    /// Open the durable storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn storage(&self) -> Result<FileStorage, CliError> {
        Ok(FileStorage::open(&self.data_dir)?)
    }

    /// Open a shop over the persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or storage cannot be opened.
    pub fn open_shop(&self) -> Result<Shop, CliError> {
        Ok(Shop::open(
            Arc::new(self.load_catalog()?),
            Arc::new(self.storage()?),
            Arc::new(MemoryStorage::new()),
        ))
    }
}
