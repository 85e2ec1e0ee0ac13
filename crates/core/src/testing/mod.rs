//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external seams (the
//! remote restoration service and the host key picker), allowing the
//! orchestrator to be exercised end to end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use rekindle_core::testing::{fixtures, MockKeySelector, MockRestorationClient};
//!
//! let client = MockRestorationClient::new();
//! client.push_error(RestorationError::Timeout(Duration::from_secs(1))).await;
//!
//! let selector = MockKeySelector::with_selected(ApiKey::new("test").unwrap());
//! ```

mod mock_key_selector;
mod mock_restoration_client;

pub use mock_key_selector::MockKeySelector;
pub use mock_restoration_client::{MockRestorationClient, RecordedRestoration};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::restoration::ImagePayload;

    /// JPEG magic bytes followed by filler; enough to look like a photo.
    pub fn jpeg_payload() -> ImagePayload {
        ImagePayload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46])
    }

    /// PNG signature; the default "restored" image.
    pub fn png_payload() -> ImagePayload {
        ImagePayload::new("image/png", vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
    }
}
