use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod routes;
mod state;

#[cfg(test)]
mod test_helpers;

mod crypto {
    pub mod password;
    pub mod token;
}

mod models {
    pub mod academic_year;
    pub mod session;
    pub mod user;
}

mod repositories {
    pub mod academic_year;
    pub mod user;
}

mod storage {
    pub mod memory_tier;
    pub mod redis_tier;
    pub mod tier;
}

mod services {
    pub mod auth;
    pub mod policy;
    pub mod role_router;
    pub mod session;
    pub mod terms;
}

mod handlers {
    pub mod auth;
    pub mod navigation;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod auth;
}

use config::Config;
use state::AppState;

#[derive(Parser)]
#[command(name = "erapor", version, about = "E-Rapor session and access service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print the Argon2 hash of a password, for provisioning accounts.
    HashPassword {
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::HashPassword { password } => {
            let password = zeroize::Zeroizing::new(password);
            println!("{}", crypto::password::hash_password(&password)?);
            Ok(())
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let app = routes::build_router(state.clone());

    let ephemeral = state.ephemeral.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            tracing::info!("🧹 Running scheduled cleanup of expired in-memory sessions...");
            let removed = ephemeral.purge_expired(chrono::Utc::now()).await;
            tracing::info!(
                "✅ Cleanup job completed: {} removed, {} remaining",
                removed,
                ephemeral.len().await
            );
        }
    });

    let addr = config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ Background cleanup job started (runs every hour)");
    tracing::info!("✅ All systems operational");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
