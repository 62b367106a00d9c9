use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::bulletin::{DeactivationSchedule, MAX_ACTIVE_DAYS};
use crate::cli::utils::output;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{BulletinRepository, DatabaseManager};

#[derive(Subcommand)]
pub enum BulletinCommands {
    #[command(about = "Deactivate every bulletin past its due time")]
    Sweep,

    #[command(about = "Set when a bulletin deactivates, counted from its creation")]
    Schedule {
        #[arg(long, help = "Bulletin id")]
        id: Uuid,

        #[arg(long, help = "Days after creation; 0 deactivates at the next sweep")]
        days: i64,
    },
}

pub async fn handle(cmd: BulletinCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        BulletinCommands::Sweep => {
            let pool = DatabaseManager::main_pool(&config::config().database)?;
            let swept = BulletinRepository::new(pool).sweep(Utc::now()).await?;
            DatabaseManager::close_all().await;

            output(output_format, &json!({ "deactivated": swept }), |_| {
                println!("✓ Deactivated {} bulletins", swept)
            })
        }

        BulletinCommands::Schedule { id, days } => {
            let schedule = DeactivationSchedule::days(days)
                .with_context(|| format!("--days must be within 0..={}", MAX_ACTIVE_DAYS))?;

            let pool = DatabaseManager::main_pool(&config::config().database)?;
            let bulletin = BulletinRepository::new(pool).schedule(id, schedule).await?;
            DatabaseManager::close_all().await;

            output(output_format, &bulletin, |b| {
                println!("✓ Bulletin {} deactivates at {}", b.id, b.deactivate_at.to_rfc3339())
            })
        }
    }
}
