use anyhow::{Context, Result};

use rekindle_core::{platform_key_from_env, Config, SanitizedConfig};

/// Print the sanitized configuration as JSON.
pub fn run(config: &Config) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    let mut sanitized = SanitizedConfig::from(config);
    if !sanitized.remote.api_key_configured {
        sanitized.remote.api_key_configured = platform_key_from_env().is_some();
    }
    serde_json::to_string_pretty(&sanitized).context("Failed to serialize configuration")
}
