//! DevAssist Server: application entry point.

use anyhow::Context;
use devassist_db::repository::SurrealUserRepository;
use devassist_db::{DbManager, run_migrations, seed_admin};
use devassist_server::{AppState, ServerConfig, build_router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("devassist=info,tower_http=info")),
        )
        .json()
        .init();

    tracing::info!("Starting DevAssist server...");

    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    run_migrations(db.client())
        .await
        .context("failed to apply migrations")?;

    if let Some(admin) = config.seed_admin.clone() {
        let users =
            SurrealUserRepository::with_pepper(db.client().clone(), config.auth.pepper.clone());
        let created = seed_admin(&users, admin).await?;
        tracing::info!(created, "Admin provisioning finished");
    }

    let state = AppState::new(db.clone(), config.auth.clone(), config.ai_assist_enabled);
    let app = build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(
        port = config.port,
        ai_assist = config.ai_assist_enabled,
        "DevAssist server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("DevAssist server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
