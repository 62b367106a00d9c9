use anyhow::Context;
use tracing_subscriber::EnvFilter;

use flock_api::config::{self, RoleSource};
use flock_api::database::{roles, DatabaseManager};
use flock_api::server::app;
use flock_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Flock API in {:?} mode", config.environment);
    config.validate().context("invalid configuration")?;
    if config.security.jwt_secret.is_empty() {
        if flock_api::is_production!() {
            anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
        }
        tracing::warn!("SECURITY_JWT_SECRET is not set; every protected request will be rejected");
    }

    let pool = DatabaseManager::main_pool(&config.database).context("failed to configure database pool")?;
    if config.database.run_migrations {
        match DatabaseManager::migrate(&pool).await {
            Ok(()) => {}
            // an unreachable database is reported by /health; a failed migration is fatal
            Err(e) if e.is_connection() => tracing::warn!("Skipping migrations, database unreachable: {}", e),
            Err(e) => return Err(e).context("database migration failed"),
        }
    }

    let registry = match config.scope.role_source {
        RoleSource::Database => roles::load_registry(&pool)
            .await
            .context("failed to load role scores from database")?,
        _ => config.scope.load_static_registry()?,
    };
    let table = config.scope.scope_table().context("invalid SCOPE_DEPTH_TABLE")?;
    tracing::info!(
        "Loaded {} roles ({:?} source), {} depth rules",
        registry.len(),
        config.scope.role_source,
        table.rules().len()
    );

    let state = AppState::new(pool, registry, table, config)?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Flock API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
