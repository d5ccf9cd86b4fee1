//! Read-only product catalog.
//!
//! Products are created once at startup and shared by reference (`Arc`) with
//! every cart line that points at them. The catalog never changes while the
//! process runs.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use quickcart_core::{Price, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A product offered in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image reference (path or URL), passed through to the view.
    pub img: String,
}

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    #[error("catalog has no products")]
    Empty,
}

/// The list of products available for purchase.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Arc<Product>>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and empty lists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] or [`CatalogError::Empty`].
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self {
            products: products.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the product list is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Arc<Product>> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// All products in listing order.
    #[must_use]
    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    /// The built-in demo catalog.
    fn default() -> Self {
        let product = |id: &str, title: &str, price: u64, img: &str| {
            Arc::new(Product {
                id: ProductId::new(id),
                title: title.to_owned(),
                price: Price::from_units(price),
                img: img.to_owned(),
            })
        };

        Self {
            products: vec![
                product("1", "Shoe", 50, "image/shoe.jpeg"),
                product("2", "Shirt", 399, "image/shirt.jpg"),
                product("3", "Speaker", 999, "image/speaker.jpg"),
                product("4", "Laptop", 50_000, "image/laptop.webp"),
            ],
        }
    }
}
