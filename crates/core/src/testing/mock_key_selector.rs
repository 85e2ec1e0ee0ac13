//! Mock key-selection facility for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::credentials::{ApiKey, CredentialError, KeySelector};

/// Mock implementation of the KeySelector trait.
///
/// `open_select_key` promotes the queued key (if any) to the selected key,
/// as if the user had picked it in the host's picker.
#[derive(Debug, Default)]
pub struct MockKeySelector {
    selected: Mutex<Option<ApiKey>>,
    queued: Mutex<Option<ApiKey>>,
    fail_with: Mutex<Option<CredentialError>>,
    opens: AtomicUsize,
}

impl MockKeySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a key already selected.
    pub fn with_selected(key: ApiKey) -> Self {
        let selector = Self::default();
        *selector.selected.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
        selector
    }

    /// Key the user will pick on the next `open_select_key`.
    pub async fn queue_selection(&self, key: ApiKey) {
        *self.queued.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
    }

    /// Make the next `open_select_key` fail.
    pub async fn fail_next_open(&self, error: CredentialError) {
        *self.fail_with.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Forget the selected key.
    pub async fn clear_selection(&self) {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// How many times the picker was opened.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySelector for MockKeySelector {
    fn name(&self) -> &str {
        "mock"
    }

    async fn has_selected_api_key(&self) -> bool {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn open_select_key(&self) -> Result<(), CredentialError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self
            .fail_with
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(key) = queued {
            *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
        }
        Ok(())
    }

    fn selected_key(&self) -> Option<ApiKey> {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
