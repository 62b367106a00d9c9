use serde::Serialize;

use crate::cli::OutputFormat;

/// Print `data` as pretty JSON, or run `text` for the human format.
pub fn output<T, F>(output_format: OutputFormat, data: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text(data),
    }
    Ok(())
}
