//! Order submission against a mock remote order backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use quickcart_integration_tests::{MockOrderBackend, TestContext, shipping_form, unreachable_url};

async fn checkout_two_shoes(ctx: &TestContext) {
    ctx.post("/cart/add", &[("productId", "1"), ("quantity", "2")])
        .await;
    ctx.post("/checkout", &[]).await;
}

#[tokio::test]
async fn test_backend_assigns_order_id() {
    let backend = MockOrderBackend::start(StatusCode::CREATED, r#"{"orderId":"A-100"}"#).await;
    let ctx = TestContext::with_order_api(backend.base_url.clone());
    checkout_two_shoes(&ctx).await;

    let resp = ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["orderId"], "A-100");

    let received = backend.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["total"], "100");
    assert_eq!(received[0]["items"][0]["id"], "1");
    assert_eq!(received[0]["items"][0]["quantity"], 2);
    assert_eq!(received[0]["shipping"]["postalCode"], "411001");

    let resp = ctx.get("/order/confirmation").await;
    assert_eq!(resp.body["orderId"], "A-100");
    assert_eq!(ctx.get("/cart").await.body["itemCount"], 0);
}

#[tokio::test]
async fn test_numeric_order_id() {
    let backend = MockOrderBackend::start(StatusCode::OK, r#"{"orderId":42}"#).await;
    let ctx = TestContext::with_order_api(backend.base_url.clone());
    checkout_two_shoes(&ctx).await;

    let resp = ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(resp.body["orderId"], "42");
}

#[tokio::test]
async fn test_empty_success_body() {
    let backend = MockOrderBackend::start(StatusCode::NO_CONTENT, "").await;
    let ctx = TestContext::with_order_api(backend.base_url.clone());
    checkout_two_shoes(&ctx).await;

    let resp = ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["orderId"].is_null());
    assert_eq!(ctx.get("/cart").await.body["itemCount"], 0);
}

#[tokio::test]
async fn test_backend_rejection_keeps_cart_for_retry() {
    let backend = MockOrderBackend::start(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"message":"Out of stock"}"#,
    )
    .await;
    let ctx = TestContext::with_order_api(backend.base_url.clone());
    checkout_two_shoes(&ctx).await;

    let resp = ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(resp.error(), Some("Order failed: Out of stock"));
    assert_eq!(
        resp.trigger().unwrap()["show-toast"],
        "Order failed: Out of stock"
    );

    // Local record written, cart and checkout kept
    let resp = ctx.get("/order/confirmation").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["orderId"].is_null());
    assert_eq!(ctx.get("/cart").await.body["itemCount"], 2);
    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["submitting"], false);

    // Not stuck in loading: a retry reaches the backend again
    ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(backend.received().len(), 2);
}

#[tokio::test]
async fn test_backend_error_without_message() {
    let backend = MockOrderBackend::start(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;
    let ctx = TestContext::with_order_api(backend.base_url.clone());
    checkout_two_shoes(&ctx).await;

    let resp = ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(resp.error(), Some("Order failed: Order failed"));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let ctx = TestContext::with_order_api(unreachable_url().await);
    checkout_two_shoes(&ctx).await;

    let resp = ctx.post("/checkout/submit", &shipping_form()).await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        resp.error(),
        Some("Order failed: Order failed. Please try again.")
    );
    assert_eq!(ctx.get("/cart").await.body["itemCount"], 2);
}

#[tokio::test]
async fn test_dropped_submit_releases_checkout() {
    let backend = MockOrderBackend::hanging().await;
    let ctx = TestContext::with_order_api(backend.base_url.clone());
    checkout_two_shoes(&ctx).await;
    let form = shipping_form();

    let dropped = tokio::time::timeout(
        Duration::from_millis(500),
        ctx.post("/checkout/submit", &form),
    )
    .await;
    assert!(dropped.is_err());
    assert_eq!(backend.received().len(), 1);

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["submitting"], false);

    // The retry reaches the backend instead of being rejected as a duplicate
    let retry = tokio::time::timeout(
        Duration::from_millis(500),
        ctx.post("/checkout/submit", &form),
    )
    .await;
    assert!(retry.is_err());
    assert_eq!(backend.received().len(), 2);

    let resp = ctx.post("/checkout/cancel", &[]).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.get("/cart").await.body["itemCount"], 2);
}
