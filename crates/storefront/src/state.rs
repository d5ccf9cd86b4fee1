//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::{Catalog, CatalogError};
use crate::config::StorefrontConfig;
use crate::services::{OrderApiClient, OrderApiError};
use crate::shop::Shop;
use crate::storage::{FileStorage, MemoryStorage, StorageError};

/// Error building the application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to load catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to open data directory: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to create order API client: {0}")]
    OrderApi(#[from] OrderApiError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The shop sits behind an async
/// mutex so every cart or checkout operation runs to completion before the
/// next one starts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: Mutex<Shop>,
    order_api: Option<OrderApiClient>,
}

impl AppState {
    /// Create a new application state from its parts.
    #[must_use]
    pub fn new(config: StorefrontConfig, shop: Shop, order_api: Option<OrderApiClient>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                shop: Mutex::new(shop),
                order_api,
            }),
        }
    }

    /// Build the state described by `config`.
    ///
    /// Loads the catalog (file or built-in), opens durable storage in the
    /// data directory, and creates the order backend client if one is
    /// configured. Session state lives in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file is invalid, the data directory
    /// cannot be created, or the order client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::default(),
        };
        tracing::info!(products = catalog.len(), "Catalog loaded");

        let storage = FileStorage::open(&config.data_dir)?;
        let shop = Shop::open(
            Arc::new(catalog),
            Arc::new(storage),
            Arc::new(MemoryStorage::new()),
        );

        let order_api = config
            .order_api
            .as_ref()
            .map(OrderApiClient::new)
            .transpose()?;
        if order_api.is_none() {
            tracing::info!("No order backend configured; orders are stored locally only");
        }

        Ok(Self::new(config, shop, order_api))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the shop. Lock it for the duration of a single operation.
    #[must_use]
    pub fn shop(&self) -> &Mutex<Shop> {
        &self.inner.shop
    }

    /// Get the order backend client, if configured.
    #[must_use]
    pub fn order_api(&self) -> Option<&OrderApiClient> {
        self.inner.order_api.as_ref()
    }
}
