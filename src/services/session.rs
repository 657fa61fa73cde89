use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use zeroize::Zeroizing;

use crate::crypto::token::{generate_session_token, tokens_match};
use crate::error::{AppError, AuthError, Result, SessionError};
use crate::models::session::{ClientSlot, PersistenceTier, Session};
use crate::repositories::user::UserStore;
use crate::services::auth::CredentialVerifier;
use crate::storage::tier::StorageTier;

/// Persists sessions to one of two tiers and brings them back to life.
///
/// A slot's session lives in exactly one tier at a time.
#[derive(Clone)]
pub struct SessionStore {
    durable: Arc<dyn StorageTier>,
    ephemeral: Arc<dyn StorageTier>,
    users: Arc<dyn UserStore>,
}

impl SessionStore {
    pub fn new(
        durable: Arc<dyn StorageTier>,
        ephemeral: Arc<dyn StorageTier>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            durable,
            ephemeral,
            users,
        }
    }

    fn tier(&self, tier: PersistenceTier) -> &Arc<dyn StorageTier> {
        match tier {
            PersistenceTier::Durable => &self.durable,
            PersistenceTier::Ephemeral => &self.ephemeral,
        }
    }

    async fn write(&self, slot: &ClientSlot, session: &Session) -> Result<()> {
        let payload = sonic_rs::to_string(session)
            .map_err(|e| AppError::Serialization(format!("Session serialization failed: {}", e)))?;
        self.tier(session.tier)
            .set(&slot.storage_key(), &payload, session.expires_at)
            .await
    }

    /// Writes `session` into `tier` and evicts the slot from the other tier.
    pub async fn persist(
        &self,
        slot: &ClientSlot,
        session: &mut Session,
        tier: PersistenceTier,
    ) -> Result<()> {
        session.tier = tier;
        self.write(slot, session).await?;
        self.tier(tier.other()).remove(&slot.storage_key()).await?;

        tracing::info!(
            "💾 Session for user {} saved to {} tier ({})",
            session.user.id,
            tier,
            self.tier(tier).name()
        );
        Ok(())
    }

    /// Reads the durable tier, then the ephemeral one.
    async fn read(
        &self,
        slot: &ClientSlot,
    ) -> std::result::Result<Option<(String, PersistenceTier)>, SessionError> {
        let key = slot.storage_key();
        for tier in [PersistenceTier::Durable, PersistenceTier::Ephemeral] {
            let payload = self
                .tier(tier)
                .get(&key)
                .await
                .map_err(|e| SessionError::Storage(e.to_string()))?;
            if let Some(payload) = payload {
                return Ok(Some((payload, tier)));
            }
        }
        Ok(None)
    }

    /// Reads and parses the slot's session, keeping the raw payload.
    async fn load(
        &self,
        slot: &ClientSlot,
    ) -> std::result::Result<Option<(String, Session)>, SessionError> {
        let Some((payload, tier)) = self.read(slot).await? else {
            return Ok(None);
        };

        let mut session: Session =
            sonic_rs::from_str(&payload).map_err(|e| SessionError::Corrupt(e.to_string()))?;
        session.tier = tier;
        Ok(Some((payload, session)))
    }

    /// Whether the slot currently holds a session issued with `token`.
    pub async fn holds(&self, slot: &ClientSlot, token: &str) -> bool {
        match self.load(slot).await {
            Ok(Some((_, session))) => tokens_match(token, &session.token),
            Ok(None) => false,
            Err(e) => {
                tracing::debug!("Slot {} holds no usable session: {}", slot.id(), e);
                false
            }
        }
    }

    /// Restores the slot's session, re-validated against the user store.
    ///
    /// A `token` that doesn't match the stored one gets `None` and leaves the
    /// slot alone. Anything else short of a live, unexpired session for an
    /// active user evicts the slot and yields `None`; no error escapes.
    pub async fn rehydrate(&self, slot: &ClientSlot, token: &str) -> Option<Session> {
        match self.try_rehydrate(slot, token).await {
            Ok(session) => session,
            Err(reason) => {
                match &reason {
                    SessionError::Expired => tracing::info!("⏰ Session expired, removing..."),
                    SessionError::Revoked | SessionError::Corrupt(_) => {
                        tracing::warn!("Discarding stored session: {}", reason)
                    }
                    SessionError::RefreshFailed(_) | SessionError::Storage(_) => {
                        tracing::error!("❌ Discarding stored session: {}", reason)
                    }
                }
                if let Err(e) = self.destroy(slot).await {
                    tracing::warn!("Eviction after failed rehydration incomplete: {}", e);
                }
                None
            }
        }
    }

    async fn try_rehydrate(
        &self,
        slot: &ClientSlot,
        token: &str,
    ) -> std::result::Result<Option<Session>, SessionError> {
        let Some((payload, mut session)) = self.load(slot).await? else {
            return Ok(None);
        };

        if !tokens_match(token, &session.token) {
            tracing::warn!("❌ Session token mismatch for slot {}", slot.id());
            return Ok(None);
        }

        if session.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }

        let fresh = self
            .users
            .find_active_by_id(&session.user.id)
            .await
            .map_err(|e| SessionError::RefreshFailed(e.to_string()))?
            .filter(|record| record.is_active)
            .ok_or(SessionError::Revoked)?;

        session.user = fresh.into_profile();

        // The slot may have been destroyed or superseded during the refresh.
        match self.write_back(slot, &payload, &session).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Session for slot {} changed during refresh", slot.id());
                return Ok(None);
            }
            Err(e) => tracing::warn!("Refreshed session could not be written back: {}", e),
        }

        tracing::debug!(
            "✅ Session restored from {} tier for user {}",
            session.tier,
            session.user.id
        );
        Ok(Some(session))
    }

    /// Replaces `previous` with the refreshed session, unless it was changed.
    async fn write_back(&self, slot: &ClientSlot, previous: &str, session: &Session) -> Result<bool> {
        let payload = sonic_rs::to_string(session)
            .map_err(|e| AppError::Serialization(format!("Session serialization failed: {}", e)))?;
        self.tier(session.tier)
            .replace(&slot.storage_key(), previous, &payload, session.expires_at)
            .await
    }

    /// Evicts the slot from both tiers. Safe to call repeatedly.
    pub async fn destroy(&self, slot: &ClientSlot) -> Result<()> {
        let key = slot.storage_key();
        let durable = self.durable.remove(&key).await;
        let ephemeral = self.ephemeral.remove(&key).await;
        durable.and(ephemeral)
    }
}

/// A login request as the view layer reports it.
#[derive(Clone)]
pub struct LoginAttempt {
    pub username: String,
    pub password: Zeroizing<String>,
    pub term: String,
    pub remember_me: bool,
}

impl fmt::Debug for LoginAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("term", &self.term)
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Owns the session lifecycle: login, restore, logout.
#[derive(Clone)]
pub struct SessionManager {
    verifier: CredentialVerifier,
    store: SessionStore,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(verifier: CredentialVerifier, store: SessionStore, ttl: Duration) -> Self {
        Self {
            verifier,
            store,
            ttl,
        }
    }

    /// Verifies the attempt and makes the resulting session current for `slot`.
    pub async fn login(&self, slot: &ClientSlot, attempt: &LoginAttempt) -> Result<Session> {
        let user = self
            .verifier
            .verify(&attempt.username, &attempt.password, &attempt.term)
            .await?;

        let now = Utc::now();
        let tier = PersistenceTier::for_remember_me(attempt.remember_me);
        let mut session = Session {
            user,
            token: generate_session_token(),
            term: attempt.term.trim().to_string(),
            created_at: now,
            expires_at: now + self.ttl,
            tier,
        };

        self.store
            .persist(slot, &mut session, tier)
            .await
            .map_err(|e| AuthError::System(e.to_string()))?;

        tracing::info!("✅ User logged in: {} (term {})", session.user.id, session.term);
        Ok(session)
    }

    /// Rehydrates the slot's session if `token` is the one it was issued.
    pub async fn restore(&self, slot: &ClientSlot, token: &str) -> Option<Session> {
        self.store.rehydrate(slot, token).await
    }

    /// Whether `token` is the current session token for `slot`.
    pub async fn owns(&self, slot: &ClientSlot, token: &str) -> bool {
        self.store.holds(slot, token).await
    }

    /// Destroys the slot's session in both tiers, if `token` owns it.
    ///
    /// # Returns
    ///
    /// Whether a session was destroyed.
    pub async fn logout(&self, slot: &ClientSlot, token: &str) -> Result<bool> {
        if !self.store.holds(slot, token).await {
            tracing::debug!("Logout for slot {} without a matching session", slot.id());
            return Ok(false);
        }

        self.store.destroy(slot).await?;
        tracing::info!("👋 Session slot {} cleared", slot.id());
        Ok(true)
    }
}
