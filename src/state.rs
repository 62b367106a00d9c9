use std::sync::Arc;

use sqlx::PgPool;

use crate::access::{RoleRegistry, ScopeTable};
use crate::bulletin::DeactivationSchedule;
use crate::config::AppConfig;
use crate::location::CodeGenerator;

/// Shared, read-only state handed to every request.
///
/// The registry and scope table are loaded once at startup and never
/// mutated, so concurrent resolution needs no locking.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<RoleRegistry>,
    pub table: Arc<ScopeTable>,
    pub generator: CodeGenerator,
    pub schedule: DeactivationSchedule,
    pub config: &'static AppConfig,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        registry: RoleRegistry,
        table: ScopeTable,
        config: &'static AppConfig,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            pool,
            registry: Arc::new(registry),
            table: Arc::new(table),
            generator: config.scope.code_generator(),
            schedule: config.bulletin.schedule()?,
            config,
        })
    }

    /// Clamp a requested page size to the configured bounds.
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.config.api.default_page_size)
            .clamp(1, self.config.api.max_page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://flock@127.0.0.1:1/flock")
            .unwrap()
    }

    fn leaked(config: AppConfig) -> &'static AppConfig {
        Box::leak(Box::new(config))
    }

    #[tokio::test]
    async fn zero_max_page_size_fails_construction() {
        let mut config = AppConfig::from_env();
        config.api.max_page_size = 0;
        let result = AppState::new(lazy_pool(), RoleRegistry::builtin(), ScopeTable::default(), leaked(config));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn huge_active_days_fails_construction() {
        let mut config = AppConfig::from_env();
        config.bulletin.active_days = i64::MAX / 2;
        let result = AppState::new(lazy_pool(), RoleRegistry::builtin(), ScopeTable::default(), leaked(config));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn page_size_never_panics_on_unvalidated_bounds() {
        let mut config = AppConfig::from_env();
        config.api.default_page_size = 25;
        config.api.max_page_size = 40;
        let mut state =
            AppState::new(lazy_pool(), RoleRegistry::builtin(), ScopeTable::default(), leaked(config.clone())).unwrap();
        assert_eq!(state.page_size(None), 25);
        assert_eq!(state.page_size(Some(500)), 40);
        assert_eq!(state.page_size(Some(-5)), 1);

        config.api.max_page_size = 0;
        state.config = leaked(config);
        assert_eq!(state.page_size(None), 1);
    }
}
