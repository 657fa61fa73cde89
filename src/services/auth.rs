use std::sync::Arc;

use crate::crypto::password;
use crate::error::AuthError;
use crate::models::user::UserProfile;
use crate::repositories::user::UserStore;
use crate::validation::auth::validate_login;

/// Checks login credentials against the user store.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Verifies a username/password/term triple.
    ///
    /// Missing inputs fail before any lookup. A wrong password is reported as
    /// `NotFound`, the same as an unknown or inactive username. Nothing is
    /// persisted here.
    ///
    /// # Returns
    ///
    /// The normalized profile of the matching active user.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
        term: &str,
    ) -> Result<UserProfile, AuthError> {
        validate_login(username, password, term)?;

        let username = username.trim();
        tracing::debug!("🔐 Authenticating user: {}", username);

        let record = self
            .users
            .find_active_by_username(username)
            .await
            .map_err(|e| AuthError::System(e.to_string()))?
            .ok_or_else(|| {
                tracing::debug!("No active user named {}", username);
                AuthError::NotFound
            })?;

        if !record.is_active {
            return Err(AuthError::NotFound);
        }

        if !password::verify_password(password, &record.password_hash)
            .map_err(|e| AuthError::System(e.to_string()))?
        {
            tracing::debug!("Password mismatch for {}", username);
            return Err(AuthError::NotFound);
        }

        let profile = record.into_profile();
        tracing::info!("✅ User authenticated: {} ({})", profile.id, profile.role);

        Ok(profile)
    }
}
