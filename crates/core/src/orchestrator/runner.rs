//! Restoration orchestrator implementation.
//!
//! Drives photos through their state machine:
//! - `process_one`: one photo, start to settled, never fails to the caller
//! - `process_all`: every eligible photo captured at call time, in order

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::photo::{PhotoError, PhotoId, PhotoLibrary};
use crate::restoration::{RestorationClient, RestorationError, RestoredImage};
use crate::session::Session;
use crate::timeout::{with_timeout, with_timeout_detached};

use super::classify::classify;
use super::config::OrchestratorConfig;
use super::types::{
    BatchProgress, BatchSummary, ItemOutcome, OrchestratorError, OrchestratorStatus,
};

/// Callback invoked after each photo of a batch run settles.
pub type ProgressCallback = Arc<dyn Fn(&BatchProgress) + Send + Sync>;

/// Clears the batch flag when a run ends, including on early return or drop.
struct BatchGuard<'a>(&'a AtomicBool);

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The restoration orchestrator.
pub struct RestorationOrchestrator {
    config: OrchestratorConfig,
    library: Arc<PhotoLibrary>,
    client: Arc<dyn RestorationClient>,
    session: Arc<Session>,
    progress: Option<ProgressCallback>,

    // Runtime state
    batch_running: AtomicBool,
}

impl std::fmt::Debug for RestorationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestorationOrchestrator")
            .field("config", &self.config)
            .field("client", &self.client.name())
            .field("batch_running", &self.is_batch_running())
            .finish()
    }
}

impl RestorationOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        library: Arc<PhotoLibrary>,
        client: Arc<dyn RestorationClient>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            config,
            library,
            client,
            session,
            progress: None,
            batch_running: AtomicBool::new(false),
        }
    }

    /// Report per-photo progress of batch runs to `callback`.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn library(&self) -> &Arc<PhotoLibrary> {
        &self.library
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_batch_running(&self) -> bool {
        self.batch_running.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            batch_running: self.is_batch_running(),
            has_credential: self.session.has_credential(),
            counts: self.library.counts().await,
        }
    }

    /// Restore one photo.
    ///
    /// A photo that is already processing or completed is left alone and no
    /// call is made. Failures are classified and stored on the photo.
    pub async fn process_one(&self, id: PhotoId) -> ItemOutcome {
        let source = match self.library.start(id).await {
            Ok(Some(source)) => source,
            Ok(None) => return ItemOutcome::Skipped,
            Err(e) => {
                debug!("Not processing photo {}: {}", id, e);
                return ItemOutcome::Skipped;
            }
        };

        // Mode is read when the call is issued, not when the batch began.
        let mode = self.session.mode().await;
        let encoded = source.encode();
        let model = self.client.model_for(mode).to_string();
        info!(
            "Restoring photo {} ({} bytes, mode: {}, model: {})",
            id,
            source.len(),
            mode,
            model
        );

        let started = Instant::now();
        let client = Arc::clone(&self.client);
        let call = async move { client.restore(&encoded, mode).await };
        let timeout = self.config.timeout();
        let result = if self.config.abort_on_timeout {
            with_timeout(call, timeout).await
        } else {
            with_timeout_detached(call, timeout).await
        };

        metrics::RESTORATION_DURATION
            .with_label_values(&[mode.as_str()])
            .observe(started.elapsed().as_secs_f64());
        let result_label = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::RESTORATION_ATTEMPTS
            .with_label_values(&[mode.as_str(), result_label])
            .inc();

        match result {
            Ok(restored) => self.settle_success(id, restored).await,
            Err(e) => self.settle_failure(id, e).await,
        }
    }

    async fn settle_success(&self, id: PhotoId, restored: RestoredImage) -> ItemOutcome {
        let size = restored.image.len();
        match self.library.complete(id, restored).await {
            Ok(()) => {
                info!("Restored photo {} ({} bytes)", id, size);
                ItemOutcome::Completed
            }
            Err(e) => {
                discard_result(id, &e);
                ItemOutcome::Skipped
            }
        }
    }

    async fn settle_failure(&self, id: PhotoId, error: RestorationError) -> ItemOutcome {
        warn!("Restoration failed for photo {}: {}", id, error);

        let classified = classify(&error);
        if classified.credential_invalid {
            self.session.downgrade_credential();
        }

        match self.library.fail(id, classified.message).await {
            Ok(()) => ItemOutcome::Failed,
            Err(e) => {
                discard_result(id, &e);
                ItemOutcome::Skipped
            }
        }
    }

    /// Restore every photo that is pending or failed at the moment of the call.
    ///
    /// Photos added afterwards wait for the next run. Only one run may be
    /// active at a time.
    pub async fn process_all(&self) -> Result<BatchSummary, OrchestratorError> {
        if self.batch_running.swap(true, Ordering::SeqCst) {
            warn!("Batch run requested while another is in progress");
            return Err(OrchestratorError::BatchInProgress);
        }
        let _guard = BatchGuard(&self.batch_running);

        let started = Instant::now();
        let ids = self.library.eligible().await;
        let total = ids.len();
        metrics::BATCH_RUNS.inc();

        let mut summary = BatchSummary {
            eligible: total,
            ..Default::default()
        };

        if total == 0 {
            debug!("Batch run found no eligible photos");
            return Ok(summary);
        }

        let parallel = self.config.max_parallel.max(1);
        info!(
            "Starting batch run over {} photo(s) (max_parallel: {})",
            total, parallel
        );

        if parallel == 1 {
            for (index, id) in ids.into_iter().enumerate() {
                let outcome = self.process_one(id).await;
                self.record(&mut summary, id, outcome, index + 1, total);
            }
        } else {
            let mut outcomes = stream::iter(ids)
                .map(|id| async move { (id, self.process_one(id).await) })
                .buffer_unordered(parallel);

            let mut done = 0;
            while let Some((id, outcome)) = outcomes.next().await {
                done += 1;
                self.record(&mut summary, id, outcome, done, total);
            }
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Batch run finished: {} completed, {} failed, {} skipped in {}ms",
            summary.completed, summary.failed, summary.skipped, summary.duration_ms
        );
        Ok(summary)
    }

    fn record(
        &self,
        summary: &mut BatchSummary,
        id: PhotoId,
        outcome: ItemOutcome,
        done: usize,
        total: usize,
    ) {
        summary.record(outcome);
        metrics::BATCH_ITEMS
            .with_label_values(&[outcome.as_str()])
            .inc();

        if let Some(callback) = &self.progress {
            callback(&BatchProgress {
                id,
                outcome,
                done,
                total,
            });
        }
    }
}

fn discard_result(id: PhotoId, error: &PhotoError) {
    match error {
        PhotoError::NotFound(_) => {
            debug!("Photo {} was removed while restoring; result dropped", id)
        }
        other => warn!("Dropping restoration result for photo {}: {}", id, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{ApiKey, CredentialResolver};
    use crate::orchestrator::classify::{
        CREDENTIAL_INVALID_MESSAGE, QUOTA_EXCEEDED_MESSAGE, TIMEOUT_MESSAGE,
    };
    use crate::photo::{InMemoryPreviews, PhotoStatus};
    use crate::restoration::RestorationMode;
    use crate::testing::{fixtures, MockRestorationClient};
    use std::sync::Mutex;
    use std::time::Duration;

    struct Harness {
        orchestrator: RestorationOrchestrator,
        library: Arc<PhotoLibrary>,
        client: Arc<MockRestorationClient>,
        session: Arc<Session>,
    }

    fn harness(config: OrchestratorConfig) -> Harness {
        let library = Arc::new(PhotoLibrary::new(Arc::new(InMemoryPreviews::new())));
        let client = Arc::new(MockRestorationClient::new());
        let session = Arc::new(Session::new(
            RestorationMode::Standard,
            CredentialResolver::new().with_platform_key(ApiKey::new("test-key")),
        ));
        let orchestrator = RestorationOrchestrator::new(
            config,
            Arc::clone(&library),
            Arc::clone(&client) as Arc<dyn RestorationClient>,
            Arc::clone(&session),
        );
        Harness {
            orchestrator,
            library,
            client,
            session,
        }
    }

    #[tokio::test]
    async fn test_process_one_success() {
        let h = harness(OrchestratorConfig::default());
        let id = h.library.add(fixtures::jpeg_payload(), None).await;

        assert_eq!(h.orchestrator.process_one(id).await, ItemOutcome::Completed);

        let photo = h.library.get(id).await.unwrap();
        assert_eq!(photo.status, PhotoStatus::Completed);
        assert_eq!(photo.result.unwrap().image, fixtures::png_payload());
        assert!(photo.error.is_none());
    }

    #[tokio::test]
    async fn test_process_one_skips_completed() {
        let h = harness(OrchestratorConfig::default());
        let id = h.library.add(fixtures::jpeg_payload(), None).await;
        h.orchestrator.process_one(id).await;

        assert_eq!(h.orchestrator.process_one(id).await, ItemOutcome::Skipped);
        assert_eq!(h.client.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_process_one_unknown_id() {
        let h = harness(OrchestratorConfig::default());
        assert_eq!(
            h.orchestrator.process_one(PhotoId::new()).await,
            ItemOutcome::Skipped
        );
        assert_eq!(h.client.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_failure_is_classified() {
        let h = harness(OrchestratorConfig::default());
        h.client
            .push_error(RestorationError::Unknown("HTTP 429".to_string()))
            .await;
        let id = h.library.add(fixtures::jpeg_payload(), None).await;

        assert_eq!(h.orchestrator.process_one(id).await, ItemOutcome::Failed);
        let photo = h.library.get(id).await.unwrap();
        assert_eq!(photo.status, PhotoStatus::Error);
        assert_eq!(photo.error.as_deref(), Some(QUOTA_EXCEEDED_MESSAGE));
        assert!(photo.result.is_none());
        assert!(h.session.has_credential());
    }

    #[tokio::test]
    async fn test_auth_failure_downgrades_credential() {
        let h = harness(OrchestratorConfig::default());
        h.client
            .push_error(RestorationError::Auth(
                "Requested entity was not found.".to_string(),
            ))
            .await;
        let id = h.library.add(fixtures::jpeg_payload(), None).await;

        h.orchestrator.process_one(id).await;
        let photo = h.library.get(id).await.unwrap();
        assert_eq!(photo.error.as_deref(), Some(CREDENTIAL_INVALID_MESSAGE));
        assert!(!h.session.has_credential());
        assert!(!h.orchestrator.status().await.has_credential);
    }

    #[tokio::test]
    async fn test_mode_read_at_issue_time() {
        let h = harness(OrchestratorConfig::default());
        let id = h.library.add(fixtures::jpeg_payload(), None).await;
        h.session.set_mode(RestorationMode::Ultra).await;

        h.orchestrator.process_one(id).await;
        let calls = h.client.recorded_calls().await;
        assert_eq!(calls[0].mode, RestorationMode::Ultra);
        let photo = h.library.get(id).await.unwrap();
        assert_eq!(photo.result.unwrap().model, "mock-ultra");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_detached() {
        let h = harness(OrchestratorConfig {
            timeout_ms: 1_000,
            ..Default::default()
        });
        h.client.set_never_resolve(true).await;
        let id = h.library.add(fixtures::jpeg_payload(), None).await;

        assert_eq!(h.orchestrator.process_one(id).await, ItemOutcome::Failed);
        let photo = h.library.get(id).await.unwrap();
        assert_eq!(photo.error.as_deref(), Some(TIMEOUT_MESSAGE));
        // The abandoned request is still running.
        assert_eq!(h.client.in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborting() {
        let h = harness(OrchestratorConfig {
            timeout_ms: 1_000,
            abort_on_timeout: true,
            ..Default::default()
        });
        h.client.set_never_resolve(true).await;
        let id = h.library.add(fixtures::jpeg_payload(), None).await;

        assert_eq!(h.orchestrator.process_one(id).await, ItemOutcome::Failed);
        assert_eq!(h.client.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_process_all_summary_and_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut h = harness(OrchestratorConfig::default());
        h.orchestrator = h
            .orchestrator
            .with_progress(Arc::new(move |p: &BatchProgress| {
                sink.lock().unwrap().push((p.done, p.total, p.outcome));
            }));

        h.client
            .push_error(RestorationError::Network("down".to_string()))
            .await;
        h.library.add(fixtures::jpeg_payload(), None).await;
        h.library.add(fixtures::jpeg_payload(), None).await;

        let summary = h.orchestrator.process_all().await.unwrap();
        assert_eq!(summary.eligible, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 1);
        assert!(!h.orchestrator.is_batch_running());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![(1, 2, ItemOutcome::Failed), (2, 2, ItemOutcome::Completed)]
        );
    }

    #[tokio::test]
    async fn test_process_all_with_nothing_eligible() {
        let h = harness(OrchestratorConfig::default());
        let summary = h.orchestrator.process_all().await.unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(h.client.call_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_process_all_rejected() {
        let h = harness(OrchestratorConfig::default());
        h.client.set_delay(Duration::from_secs(5)).await;
        h.library.add(fixtures::jpeg_payload(), None).await;

        let (first, second) = tokio::join!(h.orchestrator.process_all(), async {
            tokio::task::yield_now().await;
            h.orchestrator.process_all().await
        });
        assert_eq!(first.unwrap().completed, 1);
        assert_eq!(second, Err(OrchestratorError::BatchInProgress));

        // The flag is released once the run ends.
        assert!(h.orchestrator.process_all().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_parallelism() {
        let h = harness(OrchestratorConfig {
            max_parallel: 2,
            ..Default::default()
        });
        h.client.set_delay(Duration::from_secs(1)).await;
        for _ in 0..5 {
            h.library.add(fixtures::jpeg_payload(), None).await;
        }

        let summary = h.orchestrator.process_all().await.unwrap();
        assert_eq!(summary.completed, 5);
        assert_eq!(h.client.max_concurrent_calls(), 2);
    }
}
