//! Point-in-time copies of cart lines used to drive checkout.
//!
//! A snapshot owns its data. Once taken it is unaffected by anything that
//! later happens to the cart, including the cart being cleared.

use quickcart_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::shop::ShopError;

/// One line of a checkout snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(alias = "qty")]
    pub quantity: u32,
}

impl SnapshotLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ordered, immutable list of lines selected for checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutSnapshot {
    lines: Vec<SnapshotLine>,
}

impl CheckoutSnapshot {
    /// Copy every line of the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::EmptyCart`] if the cart has no lines.
    pub fn from_cart(cart: &Cart) -> Result<Self, ShopError> {
        if cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let lines = cart
            .lines()
            .map(|line| {
                let product = line.product();
                SnapshotLine {
                    id: product.id.clone(),
                    title: product.title.clone(),
                    price: product.price,
                    quantity: line.quantity(),
                }
            })
            .collect();

        Ok(Self { lines })
    }

    /// A one-line snapshot for "buy now", bypassing the cart.
    ///
    /// # Errors
    ///
    /// - [`ShopError::InvalidQuantity`] if `quantity` is zero
    /// - [`ShopError::NotFound`] if the product is not in the catalog
    pub fn single_item(
        catalog: &Catalog,
        product_id: &str,
        quantity: u32,
    ) -> Result<Self, ShopError> {
        if quantity == 0 {
            return Err(ShopError::InvalidQuantity);
        }
        let product = catalog
            .find(product_id)
            .ok_or_else(|| ShopError::NotFound(product_id.to_owned()))?;

        Ok(Self {
            lines: vec![SnapshotLine {
                id: product.id.clone(),
                title: product.title.clone(),
                price: product.price,
                quantity,
            }],
        })
    }

    #[must_use]
    pub fn lines(&self) -> &[SnapshotLine] {
        &self.lines
    }

    /// Sum of `price × quantity`, computed the same way as the cart subtotal.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(SnapshotLine::line_total).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart_is_rejected() {
        assert!(matches!(
            CheckoutSnapshot::from_cart(&Cart::new()),
            Err(ShopError::EmptyCart)
        ));
    }

    #[test]
    fn test_snapshot_survives_cart_clear() {
        let catalog = Catalog::default();
        let mut cart = Cart::new();
        cart.add(&catalog, "1", 2).unwrap();
        cart.add(&catalog, "3", 1).unwrap();

        let snapshot = CheckoutSnapshot::from_cart(&cart).unwrap();
        let copy = snapshot.clone();
        cart.clear();
        cart.add(&catalog, "2", 7).unwrap();

        assert_eq!(snapshot, copy);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.lines()[0].id.as_str(), "1");
        assert_eq!(snapshot.lines()[0].quantity, 2);
        assert_eq!(snapshot.total(), Price::from_units(2 * 50 + 999));
    }

    #[test]
    fn test_single_item() {
        let catalog = Catalog::default();
        let snapshot = CheckoutSnapshot::single_item(&catalog, "2", 1).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.lines()[0].title, "Shirt");
        assert_eq!(snapshot.total(), Price::from_units(399));

        assert!(matches!(
            CheckoutSnapshot::single_item(&catalog, "missing", 1),
            Err(ShopError::NotFound(_))
        ));
        assert!(matches!(
            CheckoutSnapshot::single_item(&catalog, "2", 0),
            Err(ShopError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let catalog = Catalog::default();
        let snapshot = CheckoutSnapshot::single_item(&catalog, "1", 2).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"id": "1", "title": "Shoe", "price": "50", "quantity": 2}])
        );

        let legacy: CheckoutSnapshot =
            serde_json::from_str(r#"[{"id":"1","title":"Shoe","price":50,"qty":2}]"#).unwrap();
        assert_eq!(legacy, snapshot);
    }
}
