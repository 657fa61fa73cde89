use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;

use crate::config::Config;
use crate::error::{AppError, Result};

/// Creates the PostgreSQL connection pool.
///
/// The pool never blocks forever: waiting, connecting and recycling all time
/// out, and the caller fails fast on any of them.
pub fn create_pool(config: &Config) -> Result<Pool> {
    let pg_config: tokio_postgres::Config = config.database_url.parse()?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    Pool::builder(manager)
        .max_size(config.db_pool_size)
        .wait_timeout(Some(Duration::from_secs(5)))
        .create_timeout(Some(Duration::from_secs(2)))
        .recycle_timeout(Some(Duration::from_secs(1)))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build database pool: {}", e)))
}
