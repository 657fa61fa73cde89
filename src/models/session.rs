use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserProfile;

/// Prefix of every session storage key.
pub const SESSION_KEY_PREFIX: &str = "erapor_session";

/// Which storage a session round-trips through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceTier {
    /// Survives a restart ("remember me").
    Durable,
    /// Lives only as long as the current process.
    Ephemeral,
}

impl PersistenceTier {
    /// The other tier.
    pub fn other(self) -> Self {
        match self {
            PersistenceTier::Durable => PersistenceTier::Ephemeral,
            PersistenceTier::Ephemeral => PersistenceTier::Durable,
        }
    }

    /// Picks the tier for a login request.
    pub fn for_remember_me(remember_me: bool) -> Self {
        if remember_me {
            PersistenceTier::Durable
        } else {
            PersistenceTier::Ephemeral
        }
    }
}

impl fmt::Display for PersistenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceTier::Durable => f.write_str("durable"),
            PersistenceTier::Ephemeral => f.write_str("ephemeral"),
        }
    }
}

/// Identifies one client's session slot.
///
/// At most one session is current per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientSlot(Uuid);

impl ClientSlot {
    /// Allocates a fresh slot.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing slot id.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The slot id.
    pub fn id(&self) -> Uuid {
        self.0
    }

    /// The key under which the slot's session payload is stored.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", SESSION_KEY_PREFIX, self.0)
    }
}

impl Default for ClientSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated user, refreshed on every rehydration.
    pub user: UserProfile,
    /// Opaque session marker.
    pub token: String,
    /// The semester chosen at login.
    pub term: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires. Never extended.
    pub expires_at: DateTime<Utc>,
    /// The tier this session was persisted to.
    pub tier: PersistenceTier,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_prefixed_by_slot() {
        let id = Uuid::new_v4();
        let slot = ClientSlot::from_uuid(id);
        assert_eq!(slot.storage_key(), format!("erapor_session:{id}"));
    }

    #[test]
    fn remember_me_selects_durable_tier() {
        assert_eq!(PersistenceTier::for_remember_me(true), PersistenceTier::Durable);
        assert_eq!(PersistenceTier::for_remember_me(false), PersistenceTier::Ephemeral);
        assert_eq!(PersistenceTier::Durable.other(), PersistenceTier::Ephemeral);
    }
}
