//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Domain failures arrive as
//! [`ShopError`] and are mapped to a status code, a JSON body of the form
//! `{"error": "..."}` and an `HX-Trigger` toast event so the page can show
//! the message without a reload.

use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::shop::ShopError;

/// HTMX response header carrying client-side events.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart, checkout or order operation failed.
    #[error(transparent)]
    Shop(#[from] ShopError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not logged in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shop(err) => match err {
                ShopError::NotFound(_) => StatusCode::NOT_FOUND,
                ShopError::InvalidQuantity
                | ShopError::EmptyCart
                | ShopError::Validation(_)
                | ShopError::NoPendingCheckout
                | ShopError::InvalidLogin(_) => StatusCode::BAD_REQUEST,
                ShopError::SubmissionInProgress => StatusCode::CONFLICT,
                ShopError::RemoteSubmission(_) => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show the user.
    fn user_message(&self) -> String {
        match self {
            Self::Shop(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture upstream failures to Sentry
        if matches!(self, Self::Shop(ShopError::RemoteSubmission(_))) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let message = self.user_message();

        let trigger = trigger_header(&json!({ "show-toast": message }));
        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if let Some(value) = trigger {
            response.headers_mut().insert(HX_TRIGGER, value);
        }
        response
    }
}

/// JSON formatter that writes every non-ASCII character as a `\uXXXX` escape.
struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(c.encode_utf8(&mut [0; 4]).as_bytes())?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Encode `HX-Trigger` events as a header value.
///
/// Header values must be visible ASCII, so non-ASCII text (product titles,
/// currency symbols) is escaped; clients decode it back when parsing the
/// JSON. Returns `None` only if serialization fails.
#[must_use]
pub fn trigger_header(events: &Value) -> Option<HeaderValue> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    if let Err(e) = serde::Serialize::serialize(events, &mut ser) {
        tracing::warn!(error = %e, "Dropping HX-Trigger events");
        return None;
    }
    HeaderValue::from_bytes(&buf).ok()
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
