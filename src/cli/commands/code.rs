use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output;
use crate::cli::OutputFormat;
use crate::config;
use crate::location::LocationCode;

#[derive(Subcommand)]
pub enum CodeCommands {
    #[command(about = "Generate a lettered child code from a name")]
    Generate {
        #[arg(long, help = "Parent location code")]
        parent: String,

        #[arg(long, help = "Name the suffix letters are drawn from")]
        seed: String,

        #[arg(long, help = "Codes already in use (repeatable)")]
        taken: Vec<String>,
    },

    #[command(about = "Compute the next serial code under a parent")]
    NextSerial {
        #[arg(long, help = "Parent location code")]
        parent: String,

        #[arg(long, help = "Existing child codes (repeatable)")]
        existing: Vec<String>,
    },
}

pub async fn handle(cmd: CodeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let generator = config::config().scope.code_generator();

    match cmd {
        CodeCommands::Generate { parent, seed, taken } => {
            let parent = LocationCode::parse(&parent)?;
            let mut rng = rand::thread_rng();
            let code = generator.child_code(
                &parent,
                &seed,
                |candidate| taken.iter().any(|t| t.trim().eq_ignore_ascii_case(candidate)),
                &mut rng,
            )?;

            let data = json!({ "parent": parent, "code": code, "level": code.level().as_str() });
            output(output_format, &data, |_| println!("{}", code))
        }
        CodeCommands::NextSerial { parent, existing } => {
            let parent = LocationCode::parse(&parent)?;
            let code = generator.next_serial(&parent, existing.iter().map(String::as_str))?;

            let data = json!({ "parent": parent, "code": code });
            output(output_format, &data, |_| println!("{}", code))
        }
    }
}
