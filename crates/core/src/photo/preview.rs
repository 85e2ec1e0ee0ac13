//! Preview handles for source images.
//!
//! A handle is created when a photo is added and released exactly once when
//! it is removed. Handles are not `Clone`, so releasing one consumes it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::metrics;
use crate::restoration::ImagePayload;

/// A renderable reference to a photo's source bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    url: String,
}

impl PreviewHandle {
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// URL the presentation layer can render from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Creates and frees preview handles.
pub trait PreviewProvider: Send + Sync {
    fn create(&self, source: &ImagePayload) -> PreviewHandle;

    fn release(&self, handle: PreviewHandle);
}

/// Preview provider that only tracks handle lifetimes.
///
/// Useful headless and in tests: it hands out `preview://<n>` URLs and
/// remembers which are still live.
#[derive(Debug, Default)]
pub struct InMemoryPreviews {
    next_id: AtomicU64,
    live: Mutex<HashSet<u64>>,
    released: AtomicU64,
}

impl InMemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_live(&self, id: u64) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Total number of releases performed.
    pub fn released_count(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }
}

impl PreviewProvider for InMemoryPreviews {
    fn create(&self, source: &ImagePayload) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        debug!("Created preview {} for {} bytes of {}", id, source.len(), source.mime_type());
        PreviewHandle::new(id, format!("preview://{}", id))
    }

    fn release(&self, handle: PreviewHandle) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.id);
        if removed {
            self.released.fetch_add(1, Ordering::SeqCst);
            metrics::PREVIEWS_RELEASED.inc();
        } else {
            warn!("Preview {} released but was not live", handle.id);
        }
    }
}
