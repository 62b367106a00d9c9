pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "flock")]
#[command(about = "Flock CLI - inspect access scopes and manage location codes")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Resolve and inspect access scopes")]
    Scope {
        #[command(subcommand)]
        cmd: commands::scope::ScopeCommands,
    },

    #[command(about = "Role registry")]
    Roles {
        #[command(subcommand)]
        cmd: commands::roles::RolesCommands,
    },

    #[command(about = "Location code generation")]
    Code {
        #[command(subcommand)]
        cmd: commands::code::CodeCommands,
    },

    #[command(about = "Bulletin maintenance")]
    Bulletin {
        #[command(subcommand)]
        cmd: commands::bulletin::BulletinCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Scope { cmd } => commands::scope::handle(cmd, output_format).await,
        Commands::Roles { cmd } => commands::roles::handle(cmd, output_format).await,
        Commands::Code { cmd } => commands::code::handle(cmd, output_format).await,
        Commands::Bulletin { cmd } => commands::bulletin::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scope_resolve() {
        let cli = Cli::try_parse_from([
            "flock", "--json", "scope", "resolve", "--role", "Group Admin", "--location", "DCL-234-KW-ILR-ILE-0002",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Scope { .. }));
    }

    #[test]
    fn parses_repeated_taken_codes() {
        let cli = Cli::try_parse_from([
            "flock", "code", "generate", "--parent", "DCL-234-KW-ILR", "--seed", "Ilorin East", "--taken", "DCL-234-KW-ILR-ILE",
            "--taken", "DCL-234-KW-ILR-LRN",
        ])
        .unwrap();
        match cli.command {
            Commands::Code { cmd: commands::code::CodeCommands::Generate { taken, .. } } => assert_eq!(taken.len(), 2),
            _ => panic!("expected code generate"),
        }
    }

    #[test]
    fn parses_bulletin_schedule() {
        let cli = Cli::try_parse_from([
            "flock", "bulletin", "schedule", "--id", "6f1c2e0a-5d3b-4c1e-9a7f-2b8d4e6f8a10", "--days", "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Bulletin { cmd: commands::bulletin::BulletinCommands::Schedule { id, days } } => {
                assert_eq!(id.to_string(), "6f1c2e0a-5d3b-4c1e-9a7f-2b8d4e6f8a10");
                assert_eq!(days, 0);
            }
            _ => panic!("expected bulletin schedule"),
        }

        let bad = Cli::try_parse_from(["flock", "bulletin", "schedule", "--id", "not-a-uuid", "--days", "3"]);
        assert!(bad.is_err());
    }
}
