use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No API key available: select a key or set GEMINI_API_KEY")]
    Missing,

    #[error("Key selection is not available: {0}")]
    SelectionUnavailable(String),

    #[error("Key selection failed: {0}")]
    SelectionFailed(String),
}

/// A non-empty API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" abc ").unwrap().expose(), "abc");
    }

    #[test]
    fn test_debug_redacts() {
        let key = ApiKey::new("sk-very-secret").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(<redacted>)");
    }
}
