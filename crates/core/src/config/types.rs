use serde::{Deserialize, Serialize};

use crate::orchestrator::OrchestratorConfig;
use crate::restoration::RestorationMode;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote restoration API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// API base URL (override for proxies and tests)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Platform default API key. A user-selected key takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used in standard mode
    #[serde(default = "default_standard_model")]
    pub standard_model: String,
    /// Model used in ultra mode
    #[serde(default = "default_ultra_model")]
    pub ultra_model: String,
    /// Output size requested in ultra mode (e.g. "2K", "4K")
    #[serde(default = "default_ultra_image_size")]
    pub ultra_image_size: String,
    /// Output aspect ratio requested in ultra mode
    #[serde(default = "default_ultra_aspect_ratio")]
    pub ultra_aspect_ratio: String,
    /// HTTP client timeout in seconds (independent of the orchestrator deadline)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            standard_model: default_standard_model(),
            ultra_model: default_ultra_model(),
            ultra_image_size: default_ultra_image_size(),
            ultra_aspect_ratio: default_ultra_aspect_ratio(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_standard_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_ultra_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_ultra_image_size() -> String {
    "4K".to_string()
}

fn default_ultra_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

/// Process-wide session defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub default_mode: RestorationMode,
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub remote: SanitizedRemoteConfig,
    pub orchestrator: OrchestratorConfig,
    pub session: SessionConfig,
}

/// Sanitized remote config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRemoteConfig {
    pub api_base: String,
    pub api_key_configured: bool,
    pub standard_model: String,
    pub ultra_model: String,
    pub ultra_image_size: String,
    pub ultra_aspect_ratio: String,
    pub request_timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let remote = &config.remote;
        Self {
            remote: SanitizedRemoteConfig {
                api_base: remote.api_base.clone(),
                api_key_configured: remote
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.trim().is_empty()),
                standard_model: remote.standard_model.clone(),
                ultra_model: remote.ultra_model.clone(),
                ultra_image_size: remote.ultra_image_size.clone(),
                ultra_aspect_ratio: remote.ultra_aspect_ratio.clone(),
                request_timeout_secs: remote.request_timeout_secs,
            },
            orchestrator: config.orchestrator.clone(),
            session: config.session.clone(),
        }
    }
}
