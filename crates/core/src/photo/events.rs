//! Change notifications for the presentation layer.

use serde::Serialize;

use super::adjustments::Adjustments;
use super::item::{PhotoId, PhotoStatus};

/// Something changed in the photo library.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhotoEvent {
    Added {
        id: PhotoId,
    },
    StatusChanged {
        id: PhotoId,
        status: PhotoStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    AdjustmentsChanged {
        id: PhotoId,
        adjustments: Adjustments,
    },
    Removed {
        id: PhotoId,
    },
}

impl PhotoEvent {
    pub fn photo_id(&self) -> PhotoId {
        match self {
            PhotoEvent::Added { id }
            | PhotoEvent::StatusChanged { id, .. }
            | PhotoEvent::AdjustmentsChanged { id, .. }
            | PhotoEvent::Removed { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let id = PhotoId::new();
        let event = PhotoEvent::StatusChanged {
            id,
            status: PhotoStatus::Error,
            error: Some("Quota exceeded".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["status"], "error");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(event.photo_id(), id);
    }
}
