use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The login form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
    Term,
}

impl LoginField {
    /// The wire name of the field, as sent by the login form.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginField::Username => "username",
            LoginField::Password => "password",
            LoginField::Term => "term",
        }
    }
}

impl fmt::Display for LoginField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoginField::Username => "Username",
            LoginField::Password => "Password",
            LoginField::Term => "Term",
        };
        f.write_str(label)
    }
}

/// Failures produced by the credential verifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required login input was missing.
    #[error("{0} is required")]
    Validation(LoginField),

    /// No active user matches the given credentials.
    #[error("User not found or inactive")]
    NotFound,

    /// The data store failed or returned something unusable.
    #[error("System error: {0}")]
    System(String),
}

/// Reasons a persisted session is discarded instead of restored.
///
/// None of these reach the client: every one of them resolves to "no session".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("stored session payload is corrupt: {0}")]
    Corrupt(String),

    #[error("session expired")]
    Expired,

    #[error("user record is missing or inactive")]
    Revoked,

    #[error("profile refresh failed: {0}")]
    RefreshFailed(String),

    #[error("session storage unavailable: {0}")]
    Storage(String),
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A row was missing an expected column.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A login failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No valid session accompanied the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Message shown for every login failure that is not a missing field.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed: check your username, password and semester";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field: Option<&'static str> = None;

        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Connection pool error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable".to_string())
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session storage error".to_string())
            }

            AppError::MissingData(ref column) => {
                tracing::error!("Row is missing column: {}", column);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Auth(AuthError::Validation(missing)) => {
                tracing::debug!("Login validation failed: {} missing", missing.as_str());
                field = Some(missing.as_str());
                (StatusCode::BAD_REQUEST, AuthError::Validation(missing).to_string())
            }

            AppError::Auth(AuthError::NotFound) => {
                tracing::warn!("Login rejected: no matching active user");
                (StatusCode::UNAUTHORIZED, LOGIN_FAILED_MESSAGE.to_string())
            }

            AppError::Auth(AuthError::System(ref detail)) => {
                tracing::error!("Login failed with system error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, LOGIN_FAILED_MESSAGE.to_string())
            }

            AppError::Unauthenticated => {
                tracing::debug!("Request without a valid session");
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Serialization(ref msg) => {
                tracing::error!("Serialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = match field {
            Some(field) => sonic_rs::to_string(&sonic_rs::json!({
                "error": message,
                "field": field
            })),
            None => sonic_rs::to_string(&sonic_rs::json!({
                "error": message
            })),
        }
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = AuthError::Validation(LoginField::Term);
        assert_eq!(err.to_string(), "Term is required");
        assert_eq!(LoginField::Term.as_str(), "term");
    }

    #[test]
    fn login_failures_share_one_status_family() {
        let not_found = AppError::Auth(AuthError::NotFound).into_response();
        assert_eq!(not_found.status(), StatusCode::UNAUTHORIZED);

        let system = AppError::Auth(AuthError::System("connection reset".into())).into_response();
        assert_eq!(system.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = AppError::Auth(AuthError::Validation(LoginField::Password)).into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    }
}
