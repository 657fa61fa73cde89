//! In-memory stand-ins for the database, shared by unit and router tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::crypto::password::hash_password;
use crate::error::{AppError, Result};
use crate::models::academic_year::AcademicYear;
use crate::models::session::{PersistenceTier, Session};
use crate::models::user::UserRecord;
use crate::repositories::academic_year::AcademicYearStore;
use crate::repositories::user::UserStore;
use crate::state::AppState;
use crate::storage::memory_tier::MemoryTier;

#[derive(Default)]
struct UserTable {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
}

/// A `UserStore` over a map, with a switch to simulate outages.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    table: Arc<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: UserRecord) -> Uuid {
        let id = record.id;
        self.table.users.write().await.insert(id, record);
        id
    }

    pub async fn update<F>(&self, id: Uuid, change: F)
    where
        F: FnOnce(&mut UserRecord),
    {
        if let Some(record) = self.table.users.write().await.get_mut(&id) {
            change(record);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.table.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups issued so far.
    pub fn lookups(&self) -> usize {
        self.table.lookups.load(Ordering::SeqCst)
    }

    fn begin_lookup(&self) -> Result<()> {
        self.table.lookups.fetch_add(1, Ordering::SeqCst);
        if self.table.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_active_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        self.begin_lookup()?;
        Ok(self
            .table
            .users
            .read()
            .await
            .values()
            .find(|record| record.username == username && record.is_active)
            .cloned())
    }

    async fn find_active_by_id(&self, user_id: &Uuid) -> Result<Option<UserRecord>> {
        self.begin_lookup()?;
        Ok(self
            .table
            .users
            .read()
            .await
            .get(user_id)
            .filter(|record| record.is_active)
            .cloned())
    }
}

/// An `AcademicYearStore` returning a fixed list, or failing.
#[derive(Clone, Default)]
pub struct MemoryAcademicYears {
    years: Vec<AcademicYear>,
    unavailable: bool,
}

impl MemoryAcademicYears {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            years: names
                .iter()
                .map(|name| AcademicYear {
                    name: name.to_string(),
                    start_date: None,
                })
                .collect(),
            unavailable: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            years: Vec::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl AcademicYearStore for MemoryAcademicYears {
    async fn list_active(&self) -> Result<Vec<AcademicYear>> {
        if self.unavailable {
            return Err(AppError::Internal("relation academic_years does not exist".into()));
        }
        Ok(self.years.clone())
    }
}

/// An active user with a hashed password and no display-name columns.
pub fn user_record(username: &str, password: &str, role: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: hash_password(password).unwrap(),
        role: role.to_string(),
        name: None,
        nama: None,
        full_name: None,
        email: None,
        class_name: None,
        school_id: Some(Uuid::new_v4()),
        is_active: true,
        created_at: Some(Utc::now()),
        school: None,
    }
}

/// A session for `record` that expired an hour ago.
pub fn expired_session(record: &UserRecord, tier: PersistenceTier) -> Session {
    let created_at = Utc::now() - Duration::hours(25);
    Session {
        user: record.clone().into_profile(),
        token: "expired-token".to_string(),
        term: "2024/2025 Genap".to_string(),
        created_at,
        expires_at: created_at + Duration::hours(24),
        tier,
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://erapor@localhost/erapor_test".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Everything a router test needs to poke at.
pub struct TestApp {
    pub state: AppState,
    pub users: MemoryUserStore,
    pub durable: MemoryTier,
    pub ephemeral: MemoryTier,
}

pub fn test_app() -> TestApp {
    let users = MemoryUserStore::new();
    let durable = MemoryTier::new();
    let ephemeral = MemoryTier::new();

    let state = AppState::from_parts(
        test_config(),
        Arc::new(users.clone()),
        Arc::new(MemoryAcademicYears::with_names(&["2025/2026", "2024/2025"])),
        Arc::new(durable.clone()),
        ephemeral.clone(),
    );

    TestApp {
        state,
        users,
        durable,
        ephemeral,
    }
}
