//! Mock restoration client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::restoration::{
    EncodedImage, ImagePayload, RestorationClient, RestorationError, RestorationMode,
    RestoredImage,
};

/// A recorded restoration request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRestoration {
    /// Mode the request was issued with.
    pub mode: RestorationMode,
    /// Mime type of the submitted image.
    pub mime_type: String,
    /// Base64 payload as submitted.
    pub data: String,
}

/// Mock implementation of the RestorationClient trait.
///
/// Provides controllable behavior for testing:
/// - Scripted responses, consumed in call order
/// - A default response once the script runs out
/// - Simulated latency, or calls that never settle
/// - Concurrency tracking (how many calls overlapped)
///
/// # Example
///
/// ```rust,ignore
/// use rekindle_core::testing::{fixtures, MockRestorationClient};
///
/// let client = MockRestorationClient::new();
/// client.push_error(RestorationError::Quota("429".into())).await;
/// client.push_image(fixtures::png_payload()).await;
///
/// // First call fails with quota, second succeeds, later calls use the default.
/// assert_eq!(client.call_count().await, 0);
/// ```
#[derive(Debug)]
pub struct MockRestorationClient {
    /// Responses handed out in order.
    script: Arc<RwLock<VecDeque<Result<ImagePayload, RestorationError>>>>,
    /// Response used when the script is empty.
    default_response: Arc<RwLock<Result<ImagePayload, RestorationError>>>,
    /// Recorded requests.
    calls: Arc<RwLock<Vec<RecordedRestoration>>>,
    /// Simulated latency per call.
    delay: Arc<RwLock<Duration>>,
    /// When set, calls never settle.
    hang: Arc<RwLock<bool>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockRestorationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRestorationClient {
    /// Create a mock that restores every image into a small PNG.
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_response: Arc::new(RwLock::new(Ok(super::fixtures::png_payload()))),
            calls: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            hang: Arc::new(RwLock::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a successful response.
    pub async fn push_image(&self, image: ImagePayload) {
        self.script.write().await.push_back(Ok(image));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: RestorationError) {
        self.script.write().await.push_back(Err(error));
    }

    /// Set the response used once the script is exhausted.
    pub async fn set_default_response(&self, response: Result<ImagePayload, RestorationError>) {
        *self.default_response.write().await = response;
    }

    /// Set the simulated latency for each call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Make every subsequent call hang forever.
    pub async fn set_never_resolve(&self, hang: bool) {
        *self.hang.write().await = hang;
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedRestoration> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Largest number of calls that were in flight at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn next_response(&self) -> Result<ImagePayload, RestorationError> {
        if let Some(response) = self.script.write().await.pop_front() {
            return response;
        }
        self.default_response.read().await.clone()
    }
}

/// Decrements the in-flight counter when a call ends, including when it is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RestorationClient for MockRestorationClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn model_for(&self, mode: RestorationMode) -> &str {
        match mode {
            RestorationMode::Standard => "mock-standard",
            RestorationMode::Ultra => "mock-ultra",
        }
    }

    async fn restore(
        &self,
        image: &EncodedImage,
        mode: RestorationMode,
    ) -> Result<RestoredImage, RestorationError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        self.calls.write().await.push(RecordedRestoration {
            mode,
            mime_type: image.mime_type.clone(),
            data: image.data.clone(),
        });

        if *self.hang.read().await {
            std::future::pending::<()>().await;
        }

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let image = self.next_response().await?;
        Ok(RestoredImage {
            image,
            model: self.model_for(mode).to_string(),
            mode,
        })
    }
}
