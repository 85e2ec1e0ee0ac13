use thiserror::Error;

use super::item::{PhotoId, PhotoStatus};

/// Errors from photo library operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    #[error("photo not found: {0}")]
    NotFound(PhotoId),

    #[error("cannot {event} photo {id}: current status is {status}")]
    InvalidTransition {
        id: PhotoId,
        status: PhotoStatus,
        event: &'static str,
    },
}
