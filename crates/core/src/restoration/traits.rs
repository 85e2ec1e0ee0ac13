//! The restoration client seam.

use async_trait::async_trait;

use super::error::RestorationError;
use super::types::{EncodedImage, RestorationMode, RestoredImage};

/// One network call to a restoration service for one image.
///
/// Implementations own model selection and response interpretation; they
/// return typed failures and never retry on their own.
#[async_trait]
pub trait RestorationClient: Send + Sync {
    /// Name of this client for logging.
    fn name(&self) -> &str;

    /// Model identifier used for the given mode.
    fn model_for(&self, mode: RestorationMode) -> &str;

    /// Restore one image.
    async fn restore(
        &self,
        image: &EncodedImage,
        mode: RestorationMode,
    ) -> Result<RestoredImage, RestorationError>;
}
