//! The shop state object.
//!
//! [`Shop`] owns everything the user can change: the cart, the notification
//! counter, the pending checkout snapshot and the in-flight submission flag.
//! It is created once at startup and handed to the view layer, which routes
//! user intents into the methods below.
//!
//! # Persistence
//!
//! Cart mutations write the cart to durable storage after every change. A
//! failed write is logged and otherwise ignored; the in-memory cart stays
//! authoritative.
//!
//! # Submission
//!
//! Submitting is split in two so callers need not hold the shop across the
//! network call:
//!
//! ```text
//! begin_submission  -> validate, build Order, save lastOrder, set loading
//!   (caller sends the order to the remote backend, if any)
//! complete_submission -> clear loading; on success clear cart + checkout
//! ```
//!
//! While `loading` is set, further submits and cancels are rejected. A caller
//! that gives up between the two phases hands its [`SubmissionTicket`] to
//! [`Shop::abandon_submission`], which clears the flag and keeps the
//! checkout for a retry.

mod error;

pub use error::ShopError;

use std::sync::Arc;

use chrono::Utc;
use quickcart_core::{OrderId, ShippingInfo, is_plausible_email};

use crate::cart::{Cart, CartRecord};
use crate::catalog::Catalog;
use crate::checkout::CheckoutSnapshot;
use crate::notifications::NotificationCounter;
use crate::order::Order;
use crate::services::{OrderApiClient, OrderApiError};
use crate::storage::{self, Storage, keys};

/// Value stored under [`keys::IS_LOGGED_IN`] while logged in.
const LOGGED_IN: &str = "1";

/// Identifies one in-flight submission started by [`Shop::begin_submission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

/// Cart, checkout and order state for one shopper.
pub struct Shop {
    catalog: Arc<Catalog>,
    cart: Cart,
    notifications: NotificationCounter,
    pending: Option<CheckoutSnapshot>,
    loading: Option<SubmissionTicket>,
    submissions: u64,
    storage: Arc<dyn Storage>,
    session: Arc<dyn Storage>,
}

impl Shop {
    /// Create a shop, restoring the cart from `storage`.
    ///
    /// A missing or corrupted cart record yields an empty cart.
    pub fn open(catalog: Arc<Catalog>, storage: Arc<dyn Storage>, session: Arc<dyn Storage>) -> Self {
        let cart = storage::load_json::<CartRecord>(storage.as_ref(), keys::CART)
            .map(|record| Cart::from_record(record, &catalog))
            .unwrap_or_default();

        tracing::debug!(lines = cart.line_count(), "Cart restored");

        Self {
            catalog,
            cart,
            notifications: NotificationCounter::new(),
            pending: None,
            loading: None,
            submissions: 0,
            storage,
            session,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Unread notification count.
    #[must_use]
    pub const fn notifications(&self) -> u32 {
        self.notifications.value()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add a catalog product to the cart and bump the notification count.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`] or [`ShopError::InvalidQuantity`]; the cart and
    /// counter are unchanged.
    pub fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> Result<u32, ShopError> {
        let updated = self.cart.add(&self.catalog, product_id, quantity)?;
        self.notifications.increment();
        self.persist_cart();
        tracing::debug!(product_id, quantity, line_quantity = updated, "Added to cart");
        Ok(updated)
    }

    /// Change a line's quantity by `delta`; lines reaching zero are removed.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> Option<u32> {
        let updated = self.cart.change_quantity(product_id, delta);
        self.persist_cart();
        updated
    }

    /// Remove a line if present.
    pub fn remove_from_cart(&mut self, product_id: &str) -> bool {
        let removed = self.cart.remove(product_id);
        self.persist_cart();
        removed
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist_cart();
    }

    /// Reset the notification count.
    pub const fn acknowledge_notifications(&mut self) {
        self.notifications.reset();
    }

    fn persist_cart(&self) {
        if let Err(e) = storage::save_json(self.storage.as_ref(), keys::CART, &self.cart.to_record()) {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Start checkout with a copy of the whole cart.
    ///
    /// Replaces any checkout already pending.
    ///
    /// # Errors
    ///
    /// [`ShopError::EmptyCart`] or [`ShopError::SubmissionInProgress`].
    pub fn checkout_cart(&mut self) -> Result<&CheckoutSnapshot, ShopError> {
        self.ensure_idle()?;
        let snapshot = CheckoutSnapshot::from_cart(&self.cart)?;
        Ok(self.pending.insert(snapshot))
    }

    /// Start checkout for a single product, ignoring the cart.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`], [`ShopError::InvalidQuantity`] or
    /// [`ShopError::SubmissionInProgress`].
    pub fn buy_now(&mut self, product_id: &str, quantity: u32) -> Result<&CheckoutSnapshot, ShopError> {
        self.ensure_idle()?;
        let snapshot = CheckoutSnapshot::single_item(&self.catalog, product_id, quantity)?;
        Ok(self.pending.insert(snapshot))
    }

    /// The checkout in progress, if any.
    #[must_use]
    pub const fn pending_checkout(&self) -> Option<&CheckoutSnapshot> {
        self.pending.as_ref()
    }

    /// Discard the pending checkout. The cart is not touched.
    ///
    /// # Errors
    ///
    /// [`ShopError::SubmissionInProgress`] while a submission is in flight.
    pub fn cancel_checkout(&mut self) -> Result<(), ShopError> {
        self.ensure_idle()?;
        self.pending = None;
        Ok(())
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.loading.is_some()
    }

    /// Ticket of the submission in flight, if any.
    #[must_use]
    pub const fn current_submission(&self) -> Option<SubmissionTicket> {
        self.loading
    }

    const fn ensure_idle(&self) -> Result<(), ShopError> {
        if self.loading.is_some() {
            return Err(ShopError::SubmissionInProgress);
        }
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Validate and record an order for the pending checkout.
    ///
    /// On success the order is saved as `lastOrder` and the shop is marked as
    /// submitting; the caller must follow up with [`Shop::complete_submission`].
    ///
    /// # Errors
    ///
    /// - [`ShopError::SubmissionInProgress`] if a submission is in flight
    /// - [`ShopError::NoPendingCheckout`] if checkout was never started
    /// - [`ShopError::Validation`] for empty items or bad shipping details
    ///
    /// Nothing is saved and the cart is untouched on error.
    pub fn begin_submission(&mut self, shipping: &ShippingInfo) -> Result<Order, ShopError> {
        let order = self.prepare_order(shipping)?;
        self.submissions += 1;
        self.loading = Some(SubmissionTicket(self.submissions));
        Ok(order)
    }

    fn prepare_order(&self, shipping: &ShippingInfo) -> Result<Order, ShopError> {
        self.ensure_idle()?;
        let snapshot = self.pending.clone().ok_or(ShopError::NoPendingCheckout)?;
        let order = Order::build(snapshot, shipping, Utc::now())?;
        self.save_last_order(&order);
        Ok(order)
    }

    /// Give up on the submission identified by `ticket` without an outcome.
    ///
    /// The locally saved order, the cart and the pending checkout are kept so
    /// the shopper can retry. Returns `false` if `ticket` is no longer the
    /// submission in flight.
    pub fn abandon_submission(&mut self, ticket: SubmissionTicket) -> bool {
        if self.loading != Some(ticket) {
            return false;
        }
        self.loading = None;
        tracing::warn!("Order submission abandoned before completion; checkout kept for retry");
        true
    }

    /// Record the outcome of sending `order` to the remote backend.
    ///
    /// Pass `Ok(None)` when there is no backend or it returned no id.
    ///
    /// On success the order id (if any) is saved, the cart is cleared and the
    /// pending checkout discarded. On failure the locally saved order stays,
    /// and the cart and pending checkout are kept for a retry.
    ///
    /// # Errors
    ///
    /// [`ShopError::RemoteSubmission`] carrying the backend failure.
    pub fn complete_submission(
        &mut self,
        mut order: Order,
        outcome: Result<Option<OrderId>, OrderApiError>,
    ) -> Result<Order, ShopError> {
        self.loading = None;

        match outcome {
            Ok(order_id) => {
                if order_id.is_some() {
                    order.order_id = order_id;
                    self.save_last_order(&order);
                }
                self.clear_cart();
                self.pending = None;

                tracing::info!(
                    order_id = order.order_id.as_ref().map(OrderId::as_str),
                    total = %order.total,
                    items = order.items.item_count(),
                    "Order placed"
                );
                Ok(order)
            }
            Err(e) => {
                tracing::warn!(error = %e, total = %order.total, "Remote order submission failed; order kept locally");
                Err(ShopError::RemoteSubmission(e))
            }
        }
    }

    /// Submit the pending checkout in one call, holding the shop across the
    /// remote request.
    ///
    /// The shop is never marked as submitting, so dropping the returned
    /// future leaves it idle with the checkout still pending.
    ///
    /// # Errors
    ///
    /// Any error from [`Shop::begin_submission`] or
    /// [`Shop::complete_submission`].
    pub async fn submit(
        &mut self,
        shipping: &ShippingInfo,
        remote: Option<&OrderApiClient>,
    ) -> Result<Order, ShopError> {
        let order = self.prepare_order(shipping)?;
        let outcome = match remote {
            Some(client) => client.create_order(&order).await,
            None => Ok(None),
        };
        self.complete_submission(order, outcome)
    }

    /// The most recent order, if one is stored and has items.
    ///
    /// Unparseable records are treated as absent.
    #[must_use]
    pub fn last_order(&self) -> Option<Order> {
        storage::load_json::<Order>(self.storage.as_ref(), keys::LAST_ORDER)
            .filter(Order::has_items)
    }

    fn save_last_order(&self, order: &Order) {
        if let Err(e) = storage::save_json(self.storage.as_ref(), keys::LAST_ORDER, order) {
            tracing::error!(error = %e, "Failed to save order record");
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Mark the session as logged in.
    ///
    /// # Errors
    ///
    /// [`ShopError::InvalidLogin`] if the email is malformed or the password
    /// is empty.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(), ShopError> {
        if !is_plausible_email(email.trim()) {
            return Err(ShopError::InvalidLogin("A valid email is required"));
        }
        if password.is_empty() {
            return Err(ShopError::InvalidLogin("Password is required"));
        }

        if let Err(e) = self.session.set(keys::IS_LOGGED_IN, LOGGED_IN) {
            tracing::warn!(error = %e, "Failed to store login flag");
        }
        Ok(())
    }

    /// Clear the logged-in flag.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.remove(keys::IS_LOGGED_IN) {
            tracing::warn!(error = %e, "Failed to clear login flag");
        }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        matches!(self.session.get(keys::IS_LOGGED_IN), Ok(Some(flag)) if flag == LOGGED_IN)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickcart_core::{Price, ShippingField, ValidationError};

    use super::*;
    use crate::storage::MemoryStorage;

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

    fn shop_with(storage: Arc<MemoryStorage>) -> Shop {
        Shop::open(
            Arc::new(Catalog::default()),
            storage,
            Arc::new(MemoryStorage::new()),
        )
    }

    fn shop() -> Shop {
        shop_with(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_add_persists_and_counts_notifications() {
        let storage = Arc::new(MemoryStorage::new());
        let mut shop = shop_with(Arc::clone(&storage));
        shop.add_to_cart("1", 1).unwrap();
        shop.add_to_cart("1", 1).unwrap();

        assert_eq!(shop.cart().subtotal(), Price::from_units(100));
        assert_eq!(shop.notifications(), 2);

        let reopened = shop_with(storage);
        assert_eq!(reopened.cart(), shop.cart());
        assert_eq!(reopened.notifications(), 0);
    }

    #[test]
    fn test_failed_add_changes_nothing() {
        let mut shop = shop();
        assert!(matches!(shop.add_to_cart("404", 1), Err(ShopError::NotFound(_))));
        assert!(shop.cart().is_empty());
        assert_eq!(shop.notifications(), 0);
    }

    #[test]
    fn test_corrupted_cart_resets_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::CART, "{{{ definitely not json").unwrap();
        let mut shop = shop_with(Arc::clone(&storage));
        assert!(shop.cart().is_empty());

        shop.add_to_cart("2", 1).unwrap();
        assert_eq!(shop.cart().item_count(), 1);
        assert!(storage.get(keys::CART).unwrap().unwrap().contains("Shirt"));
    }

    #[test]
    fn test_acknowledge_resets_counter() {
        let mut shop = shop();
        shop.add_to_cart("3", 1).unwrap();
        shop.acknowledge_notifications();
        assert_eq!(shop.notifications(), 0);
    }

    #[test]
    fn test_checkout_empty_cart() {
        let mut shop = shop();
        assert!(matches!(shop.checkout_cart(), Err(ShopError::EmptyCart)));
        assert!(shop.pending_checkout().is_none());
    }

    #[test]
    fn test_cancel_keeps_cart() {
        let mut shop = shop();
        shop.add_to_cart("1", 2).unwrap();
        shop.checkout_cart().unwrap();
        shop.cancel_checkout().unwrap();

        assert!(shop.pending_checkout().is_none());
        assert_eq!(shop.cart().item_count(), 2);
    }

    #[tokio::test]
    async fn test_submit_local_clears_cart() {
        let mut shop = shop();
        shop.add_to_cart("1", 2).unwrap();
        shop.checkout_cart().unwrap();

        let order = shop.submit(&shipping(), None).await.unwrap();
        assert_eq!(order.total, Price::from_units(100));
        assert!(shop.cart().is_empty());
        assert!(shop.pending_checkout().is_none());
        assert!(!shop.is_submitting());
        assert_eq!(shop.last_order(), Some(order));
    }

    #[tokio::test]
    async fn test_submit_with_missing_field_leaves_state() {
        let mut shop = shop();
        shop.add_to_cart("1", 2).unwrap();
        shop.checkout_cart().unwrap();

        let info = ShippingInfo {
            phone: String::new(),
            ..shipping()
        };
        let err = shop.submit(&info, None).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Validation(ValidationError::MissingField(ShippingField::Phone))
        ));
        assert_eq!(shop.cart().item_count(), 2);
        assert!(shop.pending_checkout().is_some());
        assert!(shop.last_order().is_none());
    }

    #[test]
    fn test_submit_without_checkout() {
        let mut shop = shop();
        assert!(matches!(
            shop.begin_submission(&shipping()),
            Err(ShopError::NoPendingCheckout)
        ));
    }

    #[test]
    fn test_second_submission_rejected_while_loading() {
        let mut shop = shop();
        shop.add_to_cart("1", 1).unwrap();
        shop.checkout_cart().unwrap();

        let order = shop.begin_submission(&shipping()).unwrap();
        assert!(shop.is_submitting());
        assert!(matches!(
            shop.begin_submission(&shipping()),
            Err(ShopError::SubmissionInProgress)
        ));
        assert!(matches!(
            shop.cancel_checkout(),
            Err(ShopError::SubmissionInProgress)
        ));

        let placed = shop
            .complete_submission(order, Ok(Some(OrderId::new("A-1"))))
            .unwrap();
        assert_eq!(placed.order_id, Some(OrderId::new("A-1")));
        assert_eq!(shop.last_order().unwrap().order_id, placed.order_id);
    }

    #[test]
    fn test_abandoned_submission_allows_retry() {
        let mut shop = shop();
        shop.add_to_cart("1", 2).unwrap();
        shop.checkout_cart().unwrap();

        shop.begin_submission(&shipping()).unwrap();
        let ticket = shop.current_submission().unwrap();
        assert!(shop.abandon_submission(ticket));

        assert!(!shop.is_submitting());
        assert_eq!(shop.cart().item_count(), 2);
        assert!(shop.pending_checkout().is_some());
        assert!(shop.last_order().is_some());

        shop.begin_submission(&shipping()).unwrap();
        let retry = shop.current_submission().unwrap();
        assert_ne!(retry, ticket);

        // A stale ticket must not release the retry
        assert!(!shop.abandon_submission(ticket));
        assert!(shop.is_submitting());
        assert!(shop.abandon_submission(retry));
        shop.cancel_checkout().unwrap();
    }

    #[tokio::test]
    async fn test_dropped_submit_leaves_shop_idle() {
        let mut shop = shop();
        shop.add_to_cart("3", 1).unwrap();
        shop.checkout_cart().unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = url::Url::parse(&format!("http://{}/api", listener.local_addr().unwrap())).unwrap();
        let client = OrderApiClient::with_base_url(base_url).unwrap();

        // The listener never answers, so the request stays pending
        let shipping_info = shipping();
        let submit = shop.submit(&shipping_info, Some(&client));
        let result = tokio::time::timeout(std::time::Duration::from_millis(100), submit).await;
        assert!(result.is_err());

        assert!(!shop.is_submitting());
        assert!(shop.pending_checkout().is_some());
        assert_eq!(shop.cart().item_count(), 1);
        drop(listener);
    }

    #[test]
    fn test_remote_failure_keeps_local_order_and_cart() {
        let mut shop = shop();
        shop.add_to_cart("2", 1).unwrap();
        shop.checkout_cart().unwrap();

        let order = shop.begin_submission(&shipping()).unwrap();
        let err = shop
            .complete_submission(
                order,
                Err(OrderApiError::Api {
                    status: 500,
                    message: "Backend down".to_string(),
                }),
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "Order failed: Backend down");
        assert!(!shop.is_submitting());
        assert_eq!(shop.cart().item_count(), 1);
        assert!(shop.pending_checkout().is_some());
        let saved = shop.last_order().unwrap();
        assert_eq!(saved.total, Price::from_units(399));
        assert!(saved.order_id.is_none());
    }

    #[tokio::test]
    async fn test_buy_now_ignores_cart_contents() {
        let mut shop = shop();
        shop.add_to_cart("1", 5).unwrap();
        shop.buy_now("4", 1).unwrap();

        let order = shop.submit(&shipping(), None).await.unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, Price::from_units(50_000));
        assert!(shop.cart().is_empty());
    }

    #[test]
    fn test_last_order_without_items_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                keys::LAST_ORDER,
                r#"{"items":[],"total":"0","shipping":{},"createdAt":"2026-01-01T00:00:00Z"}"#,
            )
            .unwrap();
        assert!(shop_with(Arc::clone(&storage)).last_order().is_none());

        storage.set(keys::LAST_ORDER, "garbage").unwrap();
        assert!(shop_with(storage).last_order().is_none());
    }

    #[test]
    fn test_login_logout() {
        let mut shop = shop();
        assert!(!shop.is_logged_in());
        assert!(matches!(
            shop.login("nope", "pw"),
            Err(ShopError::InvalidLogin(_))
        ));
        assert!(matches!(
            shop.login("a@b.c", ""),
            Err(ShopError::InvalidLogin(_))
        ));
        shop.login("a@b.c", "pw").unwrap();
        assert!(shop.is_logged_in());
        shop.logout();
        assert!(!shop.is_logged_in());
    }
}
