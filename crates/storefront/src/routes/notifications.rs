//! Notification counter route handlers.

use axum::{Json, extract::State, response::Response};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::routes::with_trigger;
use crate::state::AppState;

/// Unread notification count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NotificationsView {
    pub count: u32,
}

/// Show the unread count.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<NotificationsView> {
    let count = state.shop().lock().await.notifications();
    Json(NotificationsView { count })
}

/// Mark all notifications as read.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Response {
    state.shop().lock().await.acknowledge_notifications();
    with_trigger(
        Json(NotificationsView { count: 0 }),
        &json!({ "notifications-cleared": true }),
    )
}
