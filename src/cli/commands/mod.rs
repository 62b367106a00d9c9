pub mod bulletin;
pub mod code;
pub mod roles;
pub mod scope;

use anyhow::Context;

use crate::access::RoleRegistry;
use crate::config::{AppConfig, RoleSource};
use crate::database::{roles as role_rows, DatabaseManager};

/// Load the role registry from whichever source the configuration names.
pub(crate) async fn load_registry(config: &AppConfig) -> anyhow::Result<RoleRegistry> {
    match config.scope.role_source {
        RoleSource::Database => {
            let pool = DatabaseManager::main_pool(&config.database)?;
            role_rows::load_registry(&pool)
                .await
                .context("failed to load role scores from database")
        }
        _ => config.scope.load_static_registry(),
    }
}
