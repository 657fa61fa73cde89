use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::academic_year::{AcademicYearStore, PgAcademicYearRepository};
use crate::repositories::user::{PgUserRepository, UserStore};
use crate::services::auth::CredentialVerifier;
use crate::services::session::{SessionManager, SessionStore};
use crate::services::terms::TermCatalog;
use crate::storage::memory_tier::MemoryTier;
use crate::storage::redis_tier::RedisTier;
use crate::storage::tier::StorageTier;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Login, restore and logout.
    pub sessions: SessionManager,
    /// Semester options for the login form.
    pub terms: TermCatalog,
    /// The in-process tier, kept here so the purge job can reach it.
    pub ephemeral: MemoryTier,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL and Redis.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(config)?;
        tracing::info!(
            "✅ PostgreSQL Pool initialized with deadpool-postgres (max {} connections)",
            config.db_pool_size
        );

        let durable = RedisTier::connect(&config.redis_url).await?;

        let ephemeral = MemoryTier::new();
        tracing::info!("✅ In-memory session tier initialized");

        Ok(Self::from_parts(
            config.clone(),
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgAcademicYearRepository::new(db)),
            Arc::new(durable),
            ephemeral,
        ))
    }

    /// Wires the services over already-built stores.
    pub fn from_parts(
        config: Config,
        users: Arc<dyn UserStore>,
        years: Arc<dyn AcademicYearStore>,
        durable: Arc<dyn StorageTier>,
        ephemeral: MemoryTier,
    ) -> Self {
        let store = SessionStore::new(durable, Arc::new(ephemeral.clone()), users.clone());
        let sessions = SessionManager::new(
            CredentialVerifier::new(users),
            store,
            chrono::Duration::hours(config.session_duration_hours),
        );

        AppState {
            config,
            sessions,
            terms: TermCatalog::new(years),
            ephemeral,
        }
    }
}
