use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::session::{ClientSlot, SESSION_KEY_PREFIX, Session},
    state::AppState,
};

/// Name of the cookie carrying `{slot}.{token}`.
pub const SESSION_COOKIE: &str = SESSION_KEY_PREFIX;

/// Splits a session cookie value into its slot and token.
pub fn parse_session_cookie(value: &str) -> Option<(ClientSlot, &str)> {
    let (slot, token) = value.split_once('.')?;
    if token.is_empty() {
        return None;
    }
    let slot = Uuid::parse_str(slot).ok()?;
    Some((ClientSlot::from_uuid(slot), token))
}

/// Formats the cookie value for `slot` and `token`.
pub fn session_cookie_value(slot: &ClientSlot, token: &str) -> String {
    format!("{}.{}", slot.id(), token)
}

/// The slot and token presented by the request's session cookie, if it parses.
pub fn presented_session(cookies: &Cookies) -> Option<(ClientSlot, String)> {
    let cookie = cookies.get(SESSION_COOKIE)?;
    parse_session_cookie(cookie.value()).map(|(slot, token)| (slot, token.to_string()))
}

/// Rehydrates the session named by the cookie.
///
/// The presented token must match the stored one; a stale cookie for a slot
/// that has since been logged into again gets nothing.
pub async fn resolve_session(state: &AppState, cookies: &Cookies) -> Option<(ClientSlot, Session)> {
    let (slot, token) = presented_session(cookies)?;
    let session = state.sessions.restore(&slot, &token).await?;
    Some((slot, session))
}

/// A middleware that requires a valid session to be present.
pub async fn require_session(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking session...");

    let (slot, session) = resolve_session(&state, &cookies)
        .await
        .ok_or(AppError::Unauthenticated)?;

    tracing::debug!("✅ Session valid for user: {}", session.user.id);

    request.extensions_mut().insert(slot);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
