use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};
use zeroize::Zeroizing;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::{
        SESSION_COOKIE, presented_session, resolve_session, session_cookie_value,
    },
    models::session::{ClientSlot, PersistenceTier, Session},
    models::user::UserProfile,
    services::policy::label_for,
    services::role_router::{RoleRouter, RouterEvent, ViewState},
    services::session::LoginAttempt,
    state::AppState,
};

/// The request payload for user login.
///
/// Absent fields deserialize as empty so they surface as validation errors
/// naming the field rather than as a generic body rejection.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// The response payload for logout.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// What the dashboard needs to render the current client.
#[derive(Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub view: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<PersistenceTier>,
}

impl SessionView {
    fn anonymous(view: ViewState) -> Self {
        Self {
            authenticated: false,
            view,
            role: None,
            role_label: None,
            initials: None,
            user: None,
            term: None,
            expires_at: None,
            tier: None,
        }
    }

    fn for_session(view: ViewState, session: Session) -> Self {
        Self {
            authenticated: view.is_role_view(),
            view,
            role: Some(session.user.role.to_string()),
            role_label: Some(label_for(&session.user.role).to_string()),
            initials: Some(session.user.initials()),
            term: Some(session.term),
            expires_at: Some(session.expires_at),
            tier: Some(session.tier),
            user: Some(session.user),
        }
    }
}

/// Builds the session cookie. Remembered sessions outlive the browser.
fn create_session_cookie(
    value: String,
    persistent_hours: Option<i64>,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    if secure {
        cookie.set_secure(true);
    }
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    if let Some(hours) = persistent_hours {
        cookie.set_max_age(Duration::hours(hours));
    }
    cookie.set_path("/");
    cookie
}

fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookies.remove(cookie);
}

fn router_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("View transition failed: {}", e))
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    let attempt = LoginAttempt {
        username: payload.username,
        password: Zeroizing::new(payload.password),
        term: payload.term,
        remember_me: payload.remember_me,
    };
    tracing::info!("🔐 Login attempt: {:?}", attempt);

    // A cookie only keeps its slot if it still owns the session there.
    let slot = match presented_session(&cookies) {
        Some((slot, token)) if state.sessions.owns(&slot, &token).await => slot,
        _ => ClientSlot::new(),
    };
    let session = state.sessions.login(&slot, &attempt).await?;

    let persistent_hours = match session.tier {
        PersistenceTier::Durable => Some(state.config.session_duration_hours),
        PersistenceTier::Ephemeral => None,
    };
    cookies.add(create_session_cookie(
        session_cookie_value(&slot, &session.token),
        persistent_hours,
        state.config.secure_cookies,
    ));
    tracing::debug!("✅ Session cookie added for slot {}", slot.id());

    let mut router = RoleRouter::new();
    let view = router
        .apply(RouterEvent::LoggedIn(session.user.role.clone()))
        .map_err(router_error)?;

    Ok((StatusCode::OK, Json(SessionView::for_session(view, session))).into_response())
}

/// Handles user logout. Succeeds whether or not a session existed.
///
/// Only the holder of the slot's current token can destroy its session.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    if let Some((slot, token)) = presented_session(&cookies) {
        state.sessions.logout(&slot, &token).await?;
    }
    clear_session_cookie(&cookies);

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Rehydrates the client's session and reports which view to mount.
#[axum::debug_handler]
pub async fn session(State(state): State<AppState>, cookies: Cookies) -> Result<Json<SessionView>> {
    let restored = resolve_session(&state, &cookies).await.map(|(_, session)| session);

    if restored.is_none() && cookies.get(SESSION_COOKIE).is_some() {
        tracing::debug!("Dropping cookie for a session that no longer exists");
        clear_session_cookie(&cookies);
    }

    let mut router = RoleRouter::new();
    let view = router.rehydrated(restored.as_ref()).map_err(router_error)?;

    Ok(Json(match restored {
        Some(session) => SessionView::for_session(view, session),
        None => SessionView::anonymous(view),
    }))
}

/// Semester options for the login form.
#[derive(Serialize)]
pub struct TermsResponse {
    pub terms: Vec<String>,
}

pub async fn terms(State(state): State<AppState>) -> Json<TermsResponse> {
    Json(TermsResponse {
        terms: state.terms.options().await,
    })
}
