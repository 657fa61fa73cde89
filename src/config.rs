use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server backing the durable session tier.
    pub redis_url: String,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// How long a session lives after login, in hours.
    pub session_duration_hours: i64,
    /// Maximum number of pooled database connections.
    pub db_pool_size: usize,
    /// Origins allowed to call the API with credentials.
    pub allowed_origins: Vec<String>,
    /// Whether cookies must be marked `Secure`.
    pub secure_cookies: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_duration_hours: i64 = lookup("SESSION_DURATION_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse()
            .context("Invalid SESSION_DURATION_HOURS")?;

        if session_duration_hours <= 0 {
            anyhow::bail!("SESSION_DURATION_HOURS must be positive");
        }

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            bind_addr: lookup("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            session_duration_hours,
            db_pool_size: lookup("DB_POOL_SIZE")
                .unwrap_or_else(|| "16".to_string())
                .parse()
                .context("Invalid DB_POOL_SIZE")?,
            allowed_origins,
            secure_cookies: lookup("APP_ENV")
                .unwrap_or_else(|| "development".to_string())
                == "production",
        })
    }
}
