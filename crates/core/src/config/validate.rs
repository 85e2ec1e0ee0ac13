use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Remote API base and model names are not empty
/// - Orchestrator deadline is not 0
/// - Parallelism is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let remote = &config.remote;
    if remote.api_base.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "remote.api_base cannot be empty".to_string(),
        ));
    }
    if !remote.api_base.starts_with("http://") && !remote.api_base.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "remote.api_base must be an http(s) URL, got {}",
            remote.api_base
        )));
    }
    if remote.standard_model.trim().is_empty() || remote.ultra_model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "remote model names cannot be empty".to_string(),
        ));
    }

    if config.orchestrator.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.timeout_ms cannot be 0".to_string(),
        ));
    }
    if config.orchestrator.max_parallel == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_parallel must be at least 1".to_string(),
        ));
    }

    Ok(())
}
