//! The owned collection of photos.
//!
//! Every mutation happens under the collection's write lock, so a transition
//! is atomic with respect to any snapshot a reader takes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::restoration::{ImagePayload, RestoredImage};

use super::adjustments::{Adjustment, Adjustments};
use super::error::PhotoError;
use super::events::PhotoEvent;
use super::item::{PhotoId, PhotoItem, PhotoStatus, StartOutcome};
use super::preview::PreviewProvider;

/// Capacity of the change event channel.
const EVENT_BUFFER_SIZE: usize = 256;

/// Read-only copy of one photo, handed to readers.
#[derive(Debug, Clone)]
pub struct PhotoSnapshot {
    pub id: PhotoId,
    pub name: Option<String>,
    pub source: ImagePayload,
    pub preview_url: String,
    pub status: PhotoStatus,
    pub result: Option<RestoredImage>,
    pub error: Option<String>,
    pub adjustments: Adjustments,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PhotoItem> for PhotoSnapshot {
    fn from(item: &PhotoItem) -> Self {
        Self {
            id: item.id(),
            name: item.name().map(str::to_string),
            source: item.source().clone(),
            preview_url: item.preview().url().to_string(),
            status: item.status(),
            result: item.state().result().cloned(),
            error: item.state().error().map(str::to_string),
            adjustments: *item.adjustments(),
            created_at: item.created_at(),
            updated_at: item.updated_at(),
        }
    }
}

/// Number of photos in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.error
    }
}

/// Ordered, owned collection of photos.
pub struct PhotoLibrary {
    items: RwLock<Vec<PhotoItem>>,
    previews: Arc<dyn PreviewProvider>,
    events: broadcast::Sender<PhotoEvent>,
}

impl std::fmt::Debug for PhotoLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoLibrary")
            .field("items", &"<items>")
            .field("previews", &"<previews>")
            .finish()
    }
}

impl PhotoLibrary {
    pub fn new(previews: Arc<dyn PreviewProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            items: RwLock::new(Vec::new()),
            previews,
            events,
        }
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<PhotoEvent> {
        self.events.subscribe()
    }

    /// Add a photo in `Pending` and create its preview.
    pub async fn add(&self, source: ImagePayload, name: Option<String>) -> PhotoId {
        let preview = self.previews.create(&source);
        let item = PhotoItem::new(source, name, preview);
        let id = item.id();

        let mut items = self.items.write().await;
        items.push(item);
        debug!("Added photo {} ({} in library)", id, items.len());
        self.emit(PhotoEvent::Added { id });
        id
    }

    /// Remove a photo in any state and release its preview.
    ///
    /// A restoration still in flight for this photo finds it gone and its
    /// result is dropped.
    pub async fn remove(&self, id: PhotoId) -> Result<(), PhotoError> {
        let item = {
            let mut items = self.items.write().await;
            let index = items
                .iter()
                .position(|item| item.id() == id)
                .ok_or(PhotoError::NotFound(id))?;
            let item = items.remove(index);
            self.emit(PhotoEvent::Removed { id });
            item
        };

        info!("Removed photo {} (was {})", id, item.status());
        self.previews.release(item.into_preview());
        Ok(())
    }

    pub async fn get(&self, id: PhotoId) -> Option<PhotoSnapshot> {
        let items = self.items.read().await;
        items
            .iter()
            .find(|item| item.id() == id)
            .map(PhotoSnapshot::from)
    }

    /// Copy of every photo, in insertion order.
    pub async fn snapshot(&self) -> Vec<PhotoSnapshot> {
        let items = self.items.read().await;
        items.iter().map(PhotoSnapshot::from).collect()
    }

    /// Ids of photos a batch run would pick up right now, in order.
    pub async fn eligible(&self) -> Vec<PhotoId> {
        let items = self.items.read().await;
        items
            .iter()
            .filter(|item| item.status().is_eligible())
            .map(PhotoItem::id)
            .collect()
    }

    pub async fn counts(&self) -> StatusCounts {
        let items = self.items.read().await;
        let mut counts = StatusCounts::default();
        for item in items.iter() {
            match item.status() {
                PhotoStatus::Pending => counts.pending += 1,
                PhotoStatus::Processing => counts.processing += 1,
                PhotoStatus::Completed => counts.completed += 1,
                PhotoStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Apply the start transition.
    ///
    /// Returns the source image when the photo moved to `Processing`, or
    /// `None` when the start was ignored because it is already processing or
    /// completed.
    pub async fn start(&self, id: PhotoId) -> Result<Option<ImagePayload>, PhotoError> {
        self.with_item(id, |item| match item.start() {
            StartOutcome::Started => Ok(Some(item.source().clone())),
            StartOutcome::Ignored(status) => {
                debug!("Ignoring start for photo {} in status {}", id, status);
                Ok(None)
            }
        })
        .await
    }

    /// Apply the success transition.
    pub async fn complete(&self, id: PhotoId, result: RestoredImage) -> Result<(), PhotoError> {
        self.with_item(id, |item| item.succeed(result)).await
    }

    /// Apply the failure transition.
    pub async fn fail(&self, id: PhotoId, message: impl Into<String>) -> Result<(), PhotoError> {
        let message = message.into();
        self.with_item(id, |item| item.fail(message)).await
    }

    /// Set one adjustment, clamped into range. Returns the stored value.
    pub async fn update_adjustment(
        &self,
        id: PhotoId,
        adjustment: Adjustment,
        value: f32,
    ) -> Result<f32, PhotoError> {
        let mut items = self.items.write().await;
        let item = find_mut(&mut items, id)?;
        let stored = item.adjustments_mut().set(adjustment, value);
        self.emit(PhotoEvent::AdjustmentsChanged {
            id,
            adjustments: *item.adjustments(),
        });
        Ok(stored)
    }

    /// Put all adjustments back to their defaults.
    pub async fn reset_adjustments(&self, id: PhotoId) -> Result<(), PhotoError> {
        let mut items = self.items.write().await;
        let item = find_mut(&mut items, id)?;
        item.adjustments_mut().reset();
        self.emit(PhotoEvent::AdjustmentsChanged {
            id,
            adjustments: *item.adjustments(),
        });
        Ok(())
    }

    /// Run a state transition under the write lock and announce any status change.
    async fn with_item<T>(
        &self,
        id: PhotoId,
        transition: impl FnOnce(&mut PhotoItem) -> Result<T, PhotoError>,
    ) -> Result<T, PhotoError> {
        let mut items = self.items.write().await;
        let item = find_mut(&mut items, id)?;
        let before = item.status();
        let output = transition(&mut *item)?;
        let after = item.status();
        if before != after {
            self.emit(PhotoEvent::StatusChanged {
                id,
                status: after,
                error: item.state().error().map(str::to_string),
            });
        }
        Ok(output)
    }

    fn emit(&self, event: PhotoEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn find_mut(items: &mut [PhotoItem], id: PhotoId) -> Result<&mut PhotoItem, PhotoError> {
    items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or(PhotoError::NotFound(id))
}

impl Drop for PhotoLibrary {
    fn drop(&mut self) {
        for item in self.items.get_mut().drain(..) {
            self.previews.release(item.into_preview());
        }
    }
}
