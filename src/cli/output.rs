use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

/// Prints `value` in the machine formats, or defers to `human`.
pub fn emit<T, F>(format: OutputFormat, value: &T, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Human => human(value),
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
            println!("{body}");
        }
        OutputFormat::Yaml => {
            let body = serde_yaml::to_string(value).context("Failed to encode YAML")?;
            print!("{body}");
        }
    }
    Ok(())
}
