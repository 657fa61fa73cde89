use async_trait::async_trait;
use chrono::NaiveDate;
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    models::academic_year::AcademicYear,
};

/// Read access to academic years.
#[async_trait]
pub trait AcademicYearStore: Send + Sync {
    /// Active academic years, most recent start date first.
    async fn list_active(&self) -> Result<Vec<AcademicYear>>;
}

/// PostgreSQL-backed `AcademicYearStore`.
#[derive(Clone)]
pub struct PgAcademicYearRepository {
    pool: Pool,
}

impl PgAcademicYearRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AcademicYearStore for PgAcademicYearRepository {
    async fn list_active(&self) -> Result<Vec<AcademicYear>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT name, start_date
                FROM academic_years
                WHERE is_active = true
                ORDER BY start_date DESC
                "#,
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<AcademicYear> {
                Ok(AcademicYear {
                    name: row
                        .try_get("name")
                        .map_err(|_| AppError::MissingData("name".to_string()))?,
                    start_date: row
                        .try_get::<_, Option<NaiveDate>>("start_date")
                        .ok()
                        .flatten(),
                })
            })
            .collect()
    }
}
