//! Local CLI configuration commands

use anyhow::Result;
use url::Url;

use crate::config::Config;
use crate::output::{print_info, print_json, print_success, OutputFormat};

/// Persist the API URL used when neither `--api-url` nor CEX_API_URL is set
pub fn set_api_url(url: &str) -> Result<()> {
    Url::parse(url)?;

    let mut config = Config::load()?;
    config.api_url = Some(url.to_string());
    let path = config.save()?;

    print_success(&format!("API URL set to {} ({})", url, path.display()));
    Ok(())
}

/// Persist the default output format
pub fn set_format(format: OutputFormat) -> Result<()> {
    let mut config = Config::load()?;
    let name = match format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
    };
    config.default_format = Some(name.to_string());
    config.save()?;

    print_success(&format!("Default output format set to {}", name));
    Ok(())
}

/// Show the stored configuration
pub fn show_config(format: OutputFormat) -> Result<()> {
    let config = Config::load()?;

    match format {
        OutputFormat::Json => print_json(&config)?,
        OutputFormat::Table => {
            print_info(&format!("Config file: {}", Config::config_path()?.display()));
            println!(
                "api_url:        {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "default_format: {}",
                config.default_format.as_deref().unwrap_or("(not set)")
            );
        }
    }

    Ok(())
}
