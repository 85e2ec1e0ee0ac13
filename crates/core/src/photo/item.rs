//! A single photo and its restoration state machine.
//!
//! ```text
//!            start                 succeed(result)
//!  Pending ─────────► Processing ─────────────────► Completed
//!     ▲                 │    ▲
//!     │                 │    │ start (retry)
//!     │                 ▼    │
//!     │               Error ─┘
//!     │          fail(message)
//! ```
//!
//! `start` on `Processing` or `Completed` is a silent no-op. Removal is not a
//! state; the library drops the item and releases its preview.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::restoration::{ImagePayload, RestoredImage};

use super::adjustments::Adjustments;
use super::error::PhotoError;
use super::preview::PreviewHandle;

/// Opaque photo identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status label without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl PhotoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoStatus::Pending => "pending",
            PhotoStatus::Processing => "processing",
            PhotoStatus::Completed => "completed",
            PhotoStatus::Error => "error",
        }
    }

    /// Whether a batch run should pick this photo up.
    pub fn is_eligible(&self) -> bool {
        matches!(self, PhotoStatus::Pending | PhotoStatus::Error)
    }
}

impl fmt::Display for PhotoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state. A result exists only in `Completed` and an error message
/// only in `Error`, so both can never be set at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoState {
    #[default]
    Pending,
    Processing {
        started_at: DateTime<Utc>,
    },
    Completed {
        result: RestoredImage,
        completed_at: DateTime<Utc>,
    },
    Error {
        message: String,
        failed_at: DateTime<Utc>,
    },
}

impl PhotoState {
    pub fn status(&self) -> PhotoStatus {
        match self {
            PhotoState::Pending => PhotoStatus::Pending,
            PhotoState::Processing { .. } => PhotoStatus::Processing,
            PhotoState::Completed { .. } => PhotoStatus::Completed,
            PhotoState::Error { .. } => PhotoStatus::Error,
        }
    }

    pub fn result(&self) -> Option<&RestoredImage> {
        match self {
            PhotoState::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PhotoState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Outcome of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The photo moved to `Processing`.
    Started,
    /// The photo was already processing or completed; nothing changed.
    Ignored(PhotoStatus),
}

/// One uploaded photo.
#[derive(Debug)]
pub struct PhotoItem {
    id: PhotoId,
    name: Option<String>,
    source: ImagePayload,
    preview: PreviewHandle,
    state: PhotoState,
    adjustments: Adjustments,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PhotoItem {
    pub fn new(source: ImagePayload, name: Option<String>, preview: PreviewHandle) -> Self {
        let now = Utc::now();
        Self {
            id: PhotoId::new(),
            name,
            source,
            preview,
            state: PhotoState::Pending,
            adjustments: Adjustments::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> PhotoId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> &ImagePayload {
        &self.source
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn state(&self) -> &PhotoState {
        &self.state
    }

    pub fn status(&self) -> PhotoStatus {
        self.state.status()
    }

    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    pub fn adjustments_mut(&mut self) -> &mut Adjustments {
        self.updated_at = Utc::now();
        &mut self.adjustments
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// `Pending | Error -> Processing`. Clears any previous error.
    pub fn start(&mut self) -> StartOutcome {
        match self.status() {
            PhotoStatus::Pending | PhotoStatus::Error => {
                self.set_state(PhotoState::Processing {
                    started_at: Utc::now(),
                });
                StartOutcome::Started
            }
            status => StartOutcome::Ignored(status),
        }
    }

    /// `Processing -> Completed`.
    pub fn succeed(&mut self, result: RestoredImage) -> Result<(), PhotoError> {
        self.require_processing("complete")?;
        self.set_state(PhotoState::Completed {
            result,
            completed_at: Utc::now(),
        });
        Ok(())
    }

    /// `Processing -> Error`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), PhotoError> {
        self.require_processing("fail")?;
        self.set_state(PhotoState::Error {
            message: message.into(),
            failed_at: Utc::now(),
        });
        Ok(())
    }

    /// Split off the preview handle so it can be released.
    pub(crate) fn into_preview(self) -> PreviewHandle {
        self.preview
    }

    fn require_processing(&self, event: &'static str) -> Result<(), PhotoError> {
        match self.status() {
            PhotoStatus::Processing => Ok(()),
            status => Err(PhotoError::InvalidTransition {
                id: self.id,
                status,
                event,
            }),
        }
    }

    fn set_state(&mut self, state: PhotoState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}
