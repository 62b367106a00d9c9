use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum RolesCommands {
    #[command(about = "List every known role and its score")]
    List,
}

pub async fn handle(cmd: RolesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RolesCommands::List => {
            let config = config::config();
            let registry = super::load_registry(config).await?;
            let entries = registry.entries();

            output(output_format, &json!({ "roles": &entries }), |_| {
                println!("{:<6} {}", "SCORE", "ROLE");
                println!("{}", "-".repeat(30));
                for entry in &entries {
                    println!("{:<6} {}", entry.score, entry.name);
                }
            })
        }
    }
}
