//! In-memory shopping cart.
//!
//! A cart maps product ids to at most one line each. Lines hold a shared
//! reference to the catalog product and a quantity that is always at least 1:
//! any change that would take a quantity to zero or below removes the line.
//!
//! The cart itself does no I/O. [`CartRecord`] is its persisted form; the
//! [`Shop`](crate::shop::Shop) decides when to write it.

use std::collections::BTreeMap;
use std::sync::Arc;

use quickcart_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Product};
use crate::shop::ShopError;

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product: Arc<Product>,
    quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn product(&self) -> &Arc<Product> {
        &self.product
    }

    /// Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The user's in-progress selection, ordered by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<ProductId, CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a catalog product.
    ///
    /// Increments the existing line or creates a new one. Returns the
    /// resulting quantity of the line.
    ///
    /// # Errors
    ///
    /// - [`ShopError::InvalidQuantity`] if `quantity` is zero
    /// - [`ShopError::NotFound`] if the product is not in the catalog
    ///
    /// The cart is unchanged on error.
    pub fn add(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        quantity: u32,
    ) -> Result<u32, ShopError> {
        if quantity == 0 {
            return Err(ShopError::InvalidQuantity);
        }
        let product = catalog
            .find(product_id)
            .ok_or_else(|| ShopError::NotFound(product_id.to_owned()))?;

        let line = self
            .lines
            .entry(product.id.clone())
            .and_modify(|line| line.quantity = line.quantity.saturating_add(quantity))
            .or_insert_with(|| CartLine {
                product: Arc::clone(product),
                quantity,
            });

        Ok(line.quantity)
    }

    /// Adjust a line's quantity by `delta`.
    ///
    /// Does nothing if the product is not in the cart. A resulting quantity of
    /// zero or below removes the line. Returns the new quantity, or `None` if
    /// there is no line afterwards.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> Option<u32> {
        let line = self.lines.get_mut(product_id)?;
        let updated = i64::from(line.quantity).saturating_add(delta);

        if updated <= 0 {
            self.lines.remove(product_id);
            return None;
        }

        line.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        Some(line.quantity)
    }

    /// Remove a line. Returns whether one was present.
    pub fn remove(&mut self, product_id: &str) -> bool {
        self.lines.remove(product_id).is_some()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `price × quantity` over all lines; zero when empty.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.values().map(CartLine::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Lines in ascending product id order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Persisted form of the cart.
    #[must_use]
    pub fn to_record(&self) -> CartRecord {
        CartRecord(
            self.lines
                .iter()
                .map(|(id, line)| {
                    (
                        id.clone(),
                        CartLineRecord {
                            product: Product::clone(&line.product),
                            quantity: i64::from(line.quantity),
                        },
                    )
                })
                .collect(),
        )
    }

    /// Rebuild a cart from its persisted form.
    ///
    /// Product data is taken from the catalog, not the record, so stale
    /// titles or prices are refreshed. Lines for products that are no longer
    /// in the catalog, and lines with a quantity below 1, are dropped.
    #[must_use]
    pub fn from_record(record: CartRecord, catalog: &Catalog) -> Self {
        let mut lines = BTreeMap::new();

        for (id, stored) in record.0 {
            let Some(product) = catalog.find(id.as_str()) else {
                tracing::debug!(product_id = %id, "Dropping cart line for unknown product");
                continue;
            };
            let Ok(quantity) = u32::try_from(stored.quantity) else {
                tracing::debug!(product_id = %id, quantity = stored.quantity, "Dropping cart line with invalid quantity");
                continue;
            };
            if quantity == 0 {
                continue;
            }
            lines.insert(
                product.id.clone(),
                CartLine {
                    product: Arc::clone(product),
                    quantity,
                },
            );
        }

        Self { lines }
    }
}

/// Persisted cart: `{ "<id>": { "product": {...}, "quantity": n } }`.
///
/// The `item`/`qty` field names written by older clients are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartRecord(pub BTreeMap<ProductId, CartLineRecord>);

/// Persisted cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineRecord {
    #[serde(alias = "item")]
    pub product: Product,
    #[serde(alias = "qty")]
    pub quantity: i64,
}
