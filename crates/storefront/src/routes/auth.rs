//! Session login route handlers.
//!
//! Login only sets a session flag; there is no account backend. The flag
//! gates `GET /order`.

use axum::{Form, Json, extract::State, response::Response};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::routes::with_redirect;
use crate::state::AppState;

/// Login form data.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Session status.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub logged_in: bool,
}

/// Log in and go to the order summary.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response> {
    state
        .shop()
        .lock()
        .await
        .login(&form.email, &form.password)?;

    tracing::info!("Session logged in");
    Ok(with_redirect(Json(SessionView { logged_in: true }), "/order"))
}

/// Log out.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Json<SessionView> {
    state.shop().lock().await.logout();
    Json(SessionView { logged_in: false })
}
