use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::access::{RoleRegistry, ScopeError, ScopeTable};
use crate::bulletin::{DeactivationSchedule, MAX_ACTIVE_DAYS};
use crate::location::codegen::{DEFAULT_MAX_ATTEMPTS, DEFAULT_SERIAL_WIDTH};
use crate::location::CodeGenerator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub scope: ScopeConfig,
    pub bulletin: BulletinConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleSource {
    Builtin,
    File,
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub role_source: RoleSource,
    pub roles_file: Option<PathBuf>,
    /// `threshold:segments` pairs; `None` uses the built-in table.
    pub depth_table: Option<String>,
    pub id_max_attempts: usize,
    pub serial_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletinConfig {
    pub active_days: i64,
    pub sweep_on_read: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(port) = env::var("FLOCK_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Scope overrides
        if let Ok(v) = env::var("SCOPE_ROLE_SOURCE") {
            self.scope.role_source = match v.to_ascii_lowercase().as_str() {
                "file" => RoleSource::File,
                "database" | "db" => RoleSource::Database,
                "builtin" => RoleSource::Builtin,
                _ => self.scope.role_source,
            };
        }
        if let Ok(v) = env::var("SCOPE_ROLES_FILE") {
            self.scope.roles_file = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("SCOPE_DEPTH_TABLE") {
            self.scope.depth_table = Some(v);
        }
        if let Ok(v) = env::var("SCOPE_ID_MAX_ATTEMPTS") {
            self.scope.id_max_attempts = v.parse().unwrap_or(self.scope.id_max_attempts);
        }
        if let Ok(v) = env::var("SCOPE_SERIAL_WIDTH") {
            self.scope.serial_width = v.parse().unwrap_or(self.scope.serial_width);
        }

        // Bulletin overrides
        if let Ok(v) = env::var("BULLETIN_ACTIVE_DAYS") {
            self.bulletin.active_days = v.parse().unwrap_or(self.bulletin.active_days);
        }
        if let Ok(v) = env::var("BULLETIN_SWEEP_ON_READ") {
            self.bulletin.sweep_on_read = v.parse().unwrap_or(self.bulletin.sweep_on_read);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/flock".to_string(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                default_page_size: 100,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret".to_string(),
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            scope: ScopeConfig::default(),
            bulletin: BulletinConfig {
                active_days: crate::bulletin::DEFAULT_ACTIVE_DAYS,
                sweep_on_read: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/flock".to_string(),
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                default_page_size: 100,
                max_page_size: 500,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            scope: ScopeConfig::default(),
            bulletin: BulletinConfig {
                active_days: crate::bulletin::DEFAULT_ACTIVE_DAYS,
                sweep_on_read: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/flock".to_string(),
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                default_page_size: 50,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            scope: ScopeConfig {
                role_source: RoleSource::Database,
                ..ScopeConfig::default()
            },
            bulletin: BulletinConfig {
                active_days: crate::bulletin::DEFAULT_ACTIVE_DAYS,
                sweep_on_read: true,
            },
        }
    }
}

impl AppConfig {
    /// Reject values that would otherwise fail per request.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.default_page_size < 1 {
            anyhow::bail!("API_DEFAULT_PAGE_SIZE must be at least 1, got {}", self.api.default_page_size);
        }
        if self.api.max_page_size < 1 {
            anyhow::bail!("API_MAX_PAGE_SIZE must be at least 1, got {}", self.api.max_page_size);
        }
        if self.api.default_page_size > self.api.max_page_size {
            anyhow::bail!(
                "API_DEFAULT_PAGE_SIZE ({}) exceeds API_MAX_PAGE_SIZE ({})",
                self.api.default_page_size,
                self.api.max_page_size
            );
        }
        self.bulletin.schedule()?;
        Ok(())
    }
}

impl BulletinConfig {
    pub fn schedule(&self) -> anyhow::Result<DeactivationSchedule> {
        DeactivationSchedule::days(self.active_days).ok_or_else(|| {
            anyhow::anyhow!(
                "BULLETIN_ACTIVE_DAYS must be within 0..={}, got {}",
                MAX_ACTIVE_DAYS,
                self.active_days
            )
        })
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            role_source: RoleSource::Builtin,
            roles_file: None,
            depth_table: None,
            id_max_attempts: DEFAULT_MAX_ATTEMPTS,
            serial_width: DEFAULT_SERIAL_WIDTH,
        }
    }
}

impl ScopeConfig {
    pub fn scope_table(&self) -> Result<ScopeTable, ScopeError> {
        match &self.depth_table {
            Some(rules) => ScopeTable::parse_rules(rules),
            None => Ok(ScopeTable::default()),
        }
    }

    pub fn code_generator(&self) -> CodeGenerator {
        CodeGenerator::new(self.id_max_attempts, self.serial_width)
    }

    /// Registry for the `Builtin` and `File` sources. `Database` is loaded by
    /// `database::roles` once a pool exists.
    pub fn load_static_registry(&self) -> anyhow::Result<RoleRegistry> {
        match (self.role_source, &self.roles_file) {
            (RoleSource::File, Some(path)) => {
                let yaml = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("failed to read roles file {}: {}", path.display(), e))?;
                Ok(RoleRegistry::from_yaml_str(&yaml)?)
            }
            (RoleSource::File, None) => anyhow::bail!("SCOPE_ROLE_SOURCE=file requires SCOPE_ROLES_FILE"),
            _ => Ok(RoleRegistry::builtin()),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
