use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify an insert failure, turning Postgres 23505 into `UniqueViolation`.
    pub fn from_insert(err: sqlx::Error, key: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::UniqueViolation(key.to_string());
            }
        }
        Self::classify(err)
    }

    /// Separate connectivity failures from query failures.
    pub fn classify(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }

    /// Keep connectivity failures distinguishable; everything else is a
    /// broken migration.
    pub fn from_migrate(err: MigrateError) -> Self {
        match err {
            MigrateError::Execute(inner) => match Self::classify(inner) {
                DatabaseError::ConnectionError(msg) => DatabaseError::ConnectionError(msg),
                other => DatabaseError::MigrationError(other.to_string()),
            },
            other => DatabaseError::MigrationError(other.to_string()),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::ConnectionError(_))
    }
}

/// Process-wide connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    fn cell() -> &'static OnceLock<PgPool> {
        static POOL: OnceLock<PgPool> = OnceLock::new();
        &POOL
    }

    /// Get the shared pool, creating it lazily on first use. No connection is
    /// opened until a query runs.
    pub fn main_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if let Some(pool) = Self::cell().get() {
            return Ok(pool.clone());
        }

        let connection_string = Self::build_connection_string(&config.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(&connection_string)?;

        // another caller may have won the race; keep whichever landed first
        let pool = Self::cell().get_or_init(|| pool).clone();
        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Validate the configured URL and apply an optional `DATABASE_NAME` override.
    fn build_connection_string(base: &str) -> Result<String, DatabaseError> {
        if base.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }
        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        if let Ok(name) = std::env::var("DATABASE_NAME") {
            if !Self::is_valid_db_name(&name) {
                return Err(DatabaseError::InvalidDatabaseUrl);
            }
            url.set_path(&format!("/{}", name));
        }
        Ok(url.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(DatabaseError::classify)?;
        Ok(())
    }

    /// Apply the embedded migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(DatabaseError::from_migrate)?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the shared pool (e.g., on shutdown)
    pub async fn close_all() {
        if let Some(pool) = Self::cell().get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }

    fn is_valid_db_name(name: &str) -> bool {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
