//! API key resolution for the remote restoration service.
//!
//! A key chosen through the host's key-selection facility takes precedence
//! over the platform default key (from configuration or the environment).
//! Having neither is a hard precondition failure for every restoration call.

mod selector;
mod types;

pub use selector::{KeySelector, StaticKeySelector};
pub use types::{ApiKey, CredentialError};

use std::sync::Arc;

use tracing::debug;

/// Environment variables consulted for the platform default key, in order.
pub const PLATFORM_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Read the platform default key from the environment.
pub fn platform_key_from_env() -> Option<ApiKey> {
    PLATFORM_KEY_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().and_then(ApiKey::new))
}

/// Resolves the key to use for the next remote call.
#[derive(Clone, Default)]
pub struct CredentialResolver {
    selector: Option<Arc<dyn KeySelector>>,
    platform_key: Option<ApiKey>,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("selector", &self.selector.as_ref().map(|s| s.name()))
            .field("platform_key", &self.platform_key.is_some())
            .finish()
    }
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selector(mut self, selector: Arc<dyn KeySelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_platform_key(mut self, key: Option<ApiKey>) -> Self {
        self.platform_key = key;
        self
    }

    pub fn selector(&self) -> Option<&Arc<dyn KeySelector>> {
        self.selector.as_ref()
    }

    /// Resolve the key for a call. Never touches the network.
    pub fn resolve(&self) -> Result<ApiKey, CredentialError> {
        if let Some(key) = self.selector.as_ref().and_then(|s| s.selected_key()) {
            debug!("Using user-selected API key");
            return Ok(key);
        }
        if let Some(key) = &self.platform_key {
            debug!("Using platform default API key");
            return Ok(key.clone());
        }
        Err(CredentialError::Missing)
    }

    pub fn is_available(&self) -> bool {
        self.resolve().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_an_error() {
        let resolver = CredentialResolver::new();
        assert!(matches!(resolver.resolve(), Err(CredentialError::Missing)));
        assert!(!resolver.is_available());
    }

    #[test]
    fn test_platform_key_used_when_nothing_selected() {
        let resolver = CredentialResolver::new()
            .with_selector(Arc::new(StaticKeySelector::new(None)))
            .with_platform_key(ApiKey::new("platform"));
        assert_eq!(resolver.resolve().unwrap().expose(), "platform");
    }

    #[test]
    fn test_selected_key_takes_precedence() {
        let resolver = CredentialResolver::new()
            .with_selector(Arc::new(StaticKeySelector::new(ApiKey::new("chosen"))))
            .with_platform_key(ApiKey::new("platform"));
        assert_eq!(resolver.resolve().unwrap().expose(), "chosen");
    }

    #[test]
    fn test_debug_hides_key() {
        let resolver = CredentialResolver::new().with_platform_key(ApiKey::new("sk-secret"));
        let debug = format!("{:?}", resolver);
        assert!(!debug.contains("sk-secret"));
    }
}
