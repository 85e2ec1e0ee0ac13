//! Host key-selection facility.

use async_trait::async_trait;

use super::types::{ApiKey, CredentialError};

/// A host facility that lets the user pick an API key.
///
/// The core only needs to know whether a key has been picked, to ask for a
/// selection, and to read the picked key when issuing a call.
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// Name of this facility for logging.
    fn name(&self) -> &str;

    async fn has_selected_api_key(&self) -> bool;

    /// Ask the host to show its key picker.
    async fn open_select_key(&self) -> Result<(), CredentialError>;

    /// The key picked by the user, if any.
    fn selected_key(&self) -> Option<ApiKey>;
}

/// A selector with a fixed key, e.g. passed on the command line.
#[derive(Debug, Clone)]
pub struct StaticKeySelector {
    key: Option<ApiKey>,
}

impl StaticKeySelector {
    pub fn new(key: Option<ApiKey>) -> Self {
        Self { key }
    }
}

#[async_trait]
impl KeySelector for StaticKeySelector {
    fn name(&self) -> &str {
        "static"
    }

    async fn has_selected_api_key(&self) -> bool {
        self.key.is_some()
    }

    async fn open_select_key(&self) -> Result<(), CredentialError> {
        Err(CredentialError::SelectionUnavailable(
            "keys are fixed at startup".to_string(),
        ))
    }

    fn selected_key(&self) -> Option<ApiKey> {
        self.key.clone()
    }
}
