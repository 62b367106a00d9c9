use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output;
use crate::cli::OutputFormat;
use crate::config;
use crate::location::LocationCode;

#[derive(Subcommand)]
pub enum ScopeCommands {
    #[command(about = "Resolve the scope prefix for a role at a location")]
    Resolve {
        #[arg(long, help = "Role name, e.g. \"Group Admin\"")]
        role: String,

        #[arg(long, help = "Full location code, e.g. DCL-234-KW-ILR-ILE-0002")]
        location: String,
    },

    #[command(about = "Show the score to depth table in effect")]
    Table,
}

pub async fn handle(cmd: ScopeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let table = config.scope.scope_table()?;

    match cmd {
        ScopeCommands::Resolve { role, location } => {
            let registry = super::load_registry(config).await?;
            let score = registry.score_for(&role)?;
            let location = LocationCode::parse(&location)?;
            let scope = table.resolve(score, &location)?;

            let data = json!({
                "role": role,
                "score": score,
                "location": location,
                "scope": scope.as_str(),
                "depth": scope.depth(),
                "level": scope.code().level().as_str(),
            });
            output(output_format, &data, |_| {
                println!("{} (score {}) at {}", role, score, location);
                println!("scope: {} ({}, {} segments)", scope, scope.code().level(), scope.depth());
            })
        }
        ScopeCommands::Table => output(output_format, &json!({ "rules": table.rules() }), |_| {
            println!("{:<10} {}", "SCORE >=", "SEGMENTS");
            println!("{}", "-".repeat(20));
            for rule in table.rules() {
                println!("{:<10} {}", rule.threshold, rule.segments);
            }
        }),
    }
}
