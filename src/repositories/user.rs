use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{SchoolSnapshot, UserRecord},
};

/// Read access to user records. Every lookup is constrained to active users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds an active user by exact username.
    async fn find_active_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Finds an active user by id.
    async fn find_active_by_id(&self, user_id: &Uuid) -> Result<Option<UserRecord>>;
}

const SELECT_USER_WITH_SCHOOL: &str = r#"
    SELECT
        u.*,
        s.id AS school_ref_id,
        s.name AS school_name,
        s.npsn AS school_npsn,
        s.address AS school_address,
        s.principal_name AS school_principal_name,
        s.logo_url AS school_logo_url
    FROM users u
    LEFT JOIN schools s ON s.id = u.school_id
"#;

/// Reads a column that may be absent from the table or NULL.
fn optional_text(row: &Row, column: &str) -> Option<String> {
    row.try_get::<_, Option<String>>(column).ok().flatten()
}

fn required<'a, T>(row: &'a Row, column: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column)
        .map_err(|_| AppError::MissingData(column.to_string()))
}

/// Maps a `users` row joined with `schools` to a `UserRecord`.
fn row_to_record(row: &Row) -> Result<UserRecord> {
    let school_id: Option<Uuid> = required(row, "school_id")?;
    let school_ref_id = row.try_get::<_, Option<Uuid>>("school_ref_id").ok().flatten();

    let school = school_ref_id.map(|id| SchoolSnapshot {
        id: Some(id),
        name: optional_text(row, "school_name").unwrap_or_default(),
        npsn: optional_text(row, "school_npsn").unwrap_or_else(|| "-".to_string()),
        address: optional_text(row, "school_address").unwrap_or_else(|| "-".to_string()),
        principal_name: optional_text(row, "school_principal_name")
            .unwrap_or_else(|| "-".to_string()),
        logo_url: optional_text(row, "school_logo_url"),
    });

    Ok(UserRecord {
        id: required(row, "id")?,
        username: required(row, "username")?,
        password_hash: required(row, "password")?,
        role: optional_text(row, "role").unwrap_or_default(),
        name: optional_text(row, "name"),
        nama: optional_text(row, "nama"),
        full_name: optional_text(row, "full_name"),
        email: optional_text(row, "email"),
        class_name: optional_text(row, "kelas"),
        school_id,
        is_active: required(row, "is_active")?,
        created_at: row
            .try_get::<_, Option<DateTime<Utc>>>("created_at")
            .ok()
            .flatten(),
        school,
    })
}

/// PostgreSQL-backed `UserStore`.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_active_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let client = self.pool.get().await?;
        let query = format!(
            "{SELECT_USER_WITH_SCHOOL} WHERE u.username = $1 AND u.is_active = true LIMIT 1"
        );
        let row = client.query_opt(query.as_str(), &[&username]).await?;
        row.map(|r| row_to_record(&r)).transpose()
    }

    async fn find_active_by_id(&self, user_id: &Uuid) -> Result<Option<UserRecord>> {
        let client = self.pool.get().await?;
        let query = format!("{SELECT_USER_WITH_SCHOOL} WHERE u.id = $1 AND u.is_active = true");
        let row = client.query_opt(query.as_str(), &[user_id]).await?;
        row.map(|r| row_to_record(&r)).transpose()
    }
}
