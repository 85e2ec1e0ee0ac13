//! Failure taxonomy for restoration calls.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a restoration client or the timeout guard.
///
/// The orchestrator is the only place these are turned into user-facing
/// messages; see `orchestrator::classify`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestorationError {
    /// Credential missing, rejected, or not found by the remote service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Remote rate limit or quota exhausted.
    #[error("quota exhausted: {0}")]
    Quota(String),

    /// The remote service could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The remote safety policy rejected the request or the output.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The response carried no usable candidate or content.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// The model answered with text instead of an image.
    #[error("model returned text instead of an image: {0}")]
    ModelRefusedText(String),

    /// The call did not settle before the deadline.
    #[error("restoration timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Unknown(String),
}

impl RestorationError {
    /// Short stable label, used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RestorationError::Auth(_) => "auth",
            RestorationError::Quota(_) => "quota",
            RestorationError::Network(_) => "network",
            RestorationError::ContentBlocked(_) => "content_blocked",
            RestorationError::EmptyResponse(_) => "empty_response",
            RestorationError::ModelRefusedText(_) => "model_refused_text",
            RestorationError::Timeout(_) => "timeout",
            RestorationError::Unknown(_) => "unknown",
        }
    }

    /// Classify a low-level transport failure by its message.
    pub fn from_transport_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("requested entity was not found")
            || lower.contains("api key not valid")
            || lower.contains("permission_denied")
        {
            RestorationError::Auth(message)
        } else if lower.contains("429")
            || lower.contains("resource_exhausted")
            || lower.contains("quota")
        {
            RestorationError::Quota(message)
        } else if lower.contains("failed to fetch")
            || lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns error")
            || lower.contains("unreachable")
        {
            RestorationError::Network(message)
        } else if lower.contains("safety") || lower.contains("blocked") {
            RestorationError::ContentBlocked(message)
        } else {
            RestorationError::Unknown(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RestorationError::Timeout(Duration::from_secs(90));
        assert_eq!(err.to_string(), "restoration timed out after 90000ms");

        let err = RestorationError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "restoration timed out after 250ms");

        let err = RestorationError::ModelRefusedText("I cannot do that".to_string());
        assert_eq!(
            err.to_string(),
            "model returned text instead of an image: I cannot do that"
        );

        let err = RestorationError::Unknown("boom".to_string());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_transport_message_classification() {
        assert!(matches!(
            RestorationError::from_transport_message("TypeError: Failed to fetch"),
            RestorationError::Network(_)
        ));
        assert!(matches!(
            RestorationError::from_transport_message("error sending request: connection refused"),
            RestorationError::Network(_)
        ));
        assert!(matches!(
            RestorationError::from_transport_message("Response was blocked due to SAFETY"),
            RestorationError::ContentBlocked(_)
        ));
        assert!(matches!(
            RestorationError::from_transport_message("got 429 RESOURCE_EXHAUSTED"),
            RestorationError::Quota(_)
        ));
        assert!(matches!(
            RestorationError::from_transport_message("Requested entity was not found."),
            RestorationError::Auth(_)
        ));
        assert_eq!(
            RestorationError::from_transport_message("something odd"),
            RestorationError::Unknown("something odd".to_string())
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(RestorationError::Quota(String::new()).kind(), "quota");
        assert_eq!(
            RestorationError::Timeout(Duration::from_millis(1)).kind(),
            "timeout"
        );
    }
}
