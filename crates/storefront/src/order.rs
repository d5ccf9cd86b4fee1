//! Finalized order records.
//!
//! An order is built once, at submission, from a checkout snapshot and the
//! shipping form. Only the most recent order is kept (`lastOrder`); the next
//! submission overwrites it.

use chrono::{DateTime, Utc};
use quickcart_core::{OrderId, Price, ShippingInfo, ValidationError};
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutSnapshot;

/// A submitted purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub items: CheckoutSnapshot,
    pub total: Price,
    #[serde(alias = "customer")]
    pub shipping: ShippingInfo,
    #[serde(alias = "orderDate")]
    pub created_at: DateTime<Utc>,
    /// Identifier assigned by the remote order backend, if one accepted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

impl Order {
    /// Validate the inputs and build an order.
    ///
    /// Shipping fields are trimmed before they are checked and stored.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptySnapshot`] if there are no items
    /// - [`ValidationError::MissingField`] / [`ValidationError::InvalidEmail`]
    ///   from [`ShippingInfo::validate`]
    pub fn build(
        items: CheckoutSnapshot,
        shipping: &ShippingInfo,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptySnapshot);
        }

        let shipping = shipping.trimmed();
        shipping.validate()?;

        Ok(Self {
            total: items.total(),
            items,
            shipping,
            created_at,
            order_id: None,
        })
    }

    /// Whether the record can be shown on the confirmation page.
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickcart_core::ShippingField;

    use super::*;
    use crate::catalog::Catalog;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Main St".to_string(),
            city: "Pune".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    #[test]
    fn test_build_computes_total() {
        let snapshot = CheckoutSnapshot::single_item(&Catalog::default(), "1", 2).unwrap();
        let order = Order::build(snapshot, &shipping(), Utc::now()).unwrap();
        assert_eq!(order.total, Price::from_units(100));
        assert!(order.order_id.is_none());
    }

    #[test]
    fn test_build_rejects_empty_snapshot() {
        assert_eq!(
            Order::build(CheckoutSnapshot::default(), &shipping(), Utc::now()),
            Err(ValidationError::EmptySnapshot)
        );
    }

    #[test]
    fn test_build_rejects_missing_field() {
        let snapshot = CheckoutSnapshot::single_item(&Catalog::default(), "1", 1).unwrap();
        let info = ShippingInfo {
            city: " ".to_string(),
            ..shipping()
        };
        assert_eq!(
            Order::build(snapshot, &info, Utc::now()),
            Err(ValidationError::MissingField(ShippingField::City))
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let snapshot = CheckoutSnapshot::single_item(&Catalog::default(), "1", 1).unwrap();
        let mut order = Order::build(snapshot, &shipping(), Utc::now()).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("orderId").is_none());

        order.order_id = Some(OrderId::new("A-17"));
        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order);
    }
}
