//! Process-scoped session state: restoration mode and credential availability.
//!
//! Both values are read-mostly and change only on explicit user action. The
//! orchestrator reads the mode when it issues each call, and its only write
//! is downgrading credential availability after an auth failure.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::credentials::{CredentialError, CredentialResolver};
use crate::restoration::RestorationMode;

#[derive(Debug)]
pub struct Session {
    mode: RwLock<RestorationMode>,
    has_credential: AtomicBool,
    credentials: CredentialResolver,
}

impl Session {
    /// Create a session; credential availability starts from what the
    /// resolver can see right now.
    pub fn new(mode: RestorationMode, credentials: CredentialResolver) -> Self {
        let available = credentials.is_available();
        Self {
            mode: RwLock::new(mode),
            has_credential: AtomicBool::new(available),
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub async fn mode(&self) -> RestorationMode {
        *self.mode.read().await
    }

    pub async fn set_mode(&self, mode: RestorationMode) {
        let mut current = self.mode.write().await;
        if *current != mode {
            info!("Restoration mode changed: {} -> {}", *current, mode);
            *current = mode;
        }
    }

    pub fn has_credential(&self) -> bool {
        self.has_credential.load(Ordering::SeqCst)
    }

    /// Mark the credential as unusable, e.g. after the remote service said
    /// the key's entity was not found.
    pub fn downgrade_credential(&self) {
        if self.has_credential.swap(false, Ordering::SeqCst) {
            warn!("Credential marked unavailable; a new key must be selected");
        }
    }

    /// Re-check availability after the host facility reports a selection.
    pub async fn refresh_credentials(&self) -> bool {
        let selected = match self.credentials.selector() {
            Some(selector) => selector.has_selected_api_key().await,
            None => false,
        };
        let available = selected || self.credentials.is_available();
        self.has_credential.store(available, Ordering::SeqCst);
        available
    }

    /// Ask the host facility for a key, then re-check availability.
    pub async fn select_key(&self) -> Result<bool, CredentialError> {
        let selector = self.credentials.selector().ok_or_else(|| {
            CredentialError::SelectionUnavailable("no key selector configured".to_string())
        })?;
        selector.open_select_key().await?;
        Ok(self.refresh_credentials().await)
    }
}
