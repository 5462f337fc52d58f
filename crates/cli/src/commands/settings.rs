//! CLI configuration commands

use anyhow::{bail, Result};

use crate::config::Config;
use crate::output::{print_json, print_success, OutputFormat};

/// Update the stored defaults; options left out keep their current value
pub fn set(default_pipeline: Option<String>, default_format: Option<OutputFormat>) -> Result<()> {
    if default_pipeline.is_none() && default_format.is_none() {
        bail!("Nothing to set; pass --default-pipeline or --default-format");
    }

    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;
    config.apply(default_pipeline, default_format);
    config.save_to(&path)?;

    print_success(&format!("Saved {}", path.display()));
    Ok(())
}

/// Print the stored configuration
pub fn show(format: OutputFormat) -> Result<()> {
    let config = Config::load()?;

    match format {
        OutputFormat::Json => print_json(&config)?,
        OutputFormat::Table => {
            println!(
                "default_pipeline: {}",
                config.default_pipeline.as_deref().unwrap_or("-")
            );
            println!(
                "default_format:   {}",
                config.default_format.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
