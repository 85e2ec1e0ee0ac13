//! Turns restoration failures into the message stored on a photo.

use crate::restoration::RestorationError;

pub const CREDENTIAL_INVALID_MESSAGE: &str =
    "API key is invalid or was not found. Please select a valid API key and try again.";
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "Quota exceeded. Please wait a moment before trying again.";
pub const CONNECTIVITY_MESSAGE: &str =
    "Network error. Please check your internet connection and try again.";
pub const TIMEOUT_MESSAGE: &str =
    "The restoration service took too long to respond. Please try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Restoration failed. Please try again.";

/// Signals recognised in raw failure messages.
const ENTITY_NOT_FOUND_SIGNAL: &str = "requested entity was not found";
const QUOTA_SIGNALS: [&str; 3] = ["429", "resource_exhausted", "quota"];
const NETWORK_SIGNALS: [&str; 3] = ["failed to fetch", "network", "fetch failed"];

/// A failure ready to be stored on a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub message: String,
    /// The session credential flag must be downgraded.
    pub credential_invalid: bool,
}

impl Classified {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            credential_invalid: false,
        }
    }

    fn credential() -> Self {
        Self {
            message: CREDENTIAL_INVALID_MESSAGE.to_string(),
            credential_invalid: true,
        }
    }
}

/// Classify a failure. Typed variants win; uncategorised failures are
/// inspected by message.
pub fn classify(error: &RestorationError) -> Classified {
    match error {
        RestorationError::Auth(_) => Classified::credential(),
        RestorationError::Quota(_) => Classified::message(QUOTA_EXCEEDED_MESSAGE),
        RestorationError::Network(_) => Classified::message(CONNECTIVITY_MESSAGE),
        RestorationError::Timeout(_) => Classified::message(TIMEOUT_MESSAGE),
        RestorationError::Unknown(raw) => classify_message(raw),
        other => Classified::message(other.to_string()),
    }
}

fn classify_message(raw: &str) -> Classified {
    let lower = raw.to_lowercase();
    if lower.contains(ENTITY_NOT_FOUND_SIGNAL) {
        Classified::credential()
    } else if QUOTA_SIGNALS.iter().any(|s| lower.contains(s)) {
        Classified::message(QUOTA_EXCEEDED_MESSAGE)
    } else if NETWORK_SIGNALS.iter().any(|s| lower.contains(s)) {
        Classified::message(CONNECTIVITY_MESSAGE)
    } else if raw.trim().is_empty() {
        Classified::message(GENERIC_FAILURE_MESSAGE)
    } else {
        Classified::message(raw.trim())
    }
}
