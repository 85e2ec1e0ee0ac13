//! Hard deadlines for restoration calls.
//!
//! Two flavours exist. [`with_timeout_detached`] moves the operation onto its
//! own task and stops waiting when the deadline passes; the request keeps
//! running and its result is discarded. [`with_timeout`] drops the future on
//! expiry, which aborts an in-flight HTTP request.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::restoration::RestorationError;

/// Default deadline for one restoration call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(90_000);

/// Race `operation` against a timer, cancelling it if the timer wins.
pub async fn with_timeout<F, T>(operation: F, duration: Duration) -> Result<T, RestorationError>
where
    F: Future<Output = Result<T, RestorationError>>,
{
    match tokio::time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => {
            debug!("Operation cancelled after {:?}", duration);
            Err(RestorationError::Timeout(duration))
        }
    }
}

/// Race `operation` against a timer without cancelling it.
///
/// The operation runs on a spawned task. If the deadline passes first the
/// caller gets [`RestorationError::Timeout`] and the task is left to finish
/// on its own; whatever it produces is dropped.
pub async fn with_timeout_detached<F, T>(
    operation: F,
    duration: Duration,
) -> Result<T, RestorationError>
where
    F: Future<Output = Result<T, RestorationError>> + Send + 'static,
    T: Send + 'static,
{
    let mut handle = tokio::spawn(operation);

    match tokio::time::timeout(duration, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RestorationError::Unknown(format!(
            "restoration task failed: {}",
            join_error
        ))),
        Err(_) => {
            debug!(
                "Deadline of {:?} passed, leaving request to finish in the background",
                duration
            );
            Err(RestorationError::Timeout(duration))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fast_operation_returns_value() {
        let result = with_timeout(async { Ok::<_, RestorationError>(7) }, DEFAULT_TIMEOUT).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_operation_error_passes_through() {
        let result: Result<(), _> = with_timeout(
            async { Err(RestorationError::Quota("slow down".to_string())) },
            DEFAULT_TIMEOUT,
        )
        .await;
        assert_eq!(result.unwrap_err(), RestorationError::Quota("slow down".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_resolving_operation_times_out() {
        let result: Result<(), _> =
            with_timeout(std::future::pending(), Duration::from_secs(90)).await;
        assert_eq!(
            result.unwrap_err(),
            RestorationError::Timeout(Duration::from_secs(90))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_operation_keeps_running_after_timeout() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result = with_timeout_detached(
            async move {
                tokio::time::sleep(Duration::from_secs(120)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, RestorationError>("late")
            },
            Duration::from_secs(90),
        )
        .await;

        assert!(matches!(result, Err(RestorationError::Timeout(_))));
        assert!(!finished.load(Ordering::SeqCst));

        // The abandoned request still completes; its result goes nowhere.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_detached_operation_returns_value() {
        let result = with_timeout_detached(
            async { Ok::<_, RestorationError>(42) },
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }
}
