//! Photos and their restoration lifecycle.
//!
//! - [`PhotoItem`]: one photo and its state machine
//! - [`PhotoLibrary`]: the owned, ordered collection with atomic transitions
//! - [`PreviewProvider`]: creation and release of preview handles
//! - [`Adjustments`]: clamped display-time parameters

mod adjustments;
mod error;
mod events;
mod item;
mod library;
mod preview;

pub use adjustments::{Adjustment, Adjustments};
pub use error::PhotoError;
pub use events::PhotoEvent;
pub use item::{PhotoId, PhotoItem, PhotoState, PhotoStatus, StartOutcome};
pub use library::{PhotoLibrary, PhotoSnapshot, StatusCounts};
pub use preview::{InMemoryPreviews, PreviewHandle, PreviewProvider};
