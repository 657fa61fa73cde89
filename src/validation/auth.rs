use crate::error::{AuthError, LoginField};

/// Validates the login inputs in form order: username, password, term.
///
/// Username and term are checked after trimming; the password is taken as is.
///
/// # Returns
///
/// The first missing field as an `AuthError::Validation`.
pub fn validate_login(username: &str, password: &str, term: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::Validation(LoginField::Username));
    }

    if password.is_empty() {
        return Err(AuthError::Validation(LoginField::Password));
    }

    if term.trim().is_empty() {
        return Err(AuthError::Validation(LoginField::Term));
    }

    Ok(())
}
