//! Image payloads and restoration modes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

/// Which remote model configuration is used for restoration.
///
/// This is a process-wide selection held by the session, read at the moment
/// each restoration call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorationMode {
    /// Repair and colour-faithful cleanup at the source resolution.
    #[default]
    Standard,
    /// Repair plus high-resolution reconstruction with a fixed square output.
    Ultra,
}

impl RestorationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestorationMode::Standard => "standard",
            RestorationMode::Ultra => "ultra",
        }
    }

    /// Returns true if this mode asks the remote model for an explicit output
    /// resolution.
    pub fn requests_upscale(&self) -> bool {
        matches!(self, RestorationMode::Ultra)
    }
}

impl fmt::Display for RestorationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestorationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(RestorationMode::Standard),
            "ultra" => Ok(RestorationMode::Ultra),
            other => Err(format!(
                "unknown restoration mode '{}', expected 'standard' or 'ultra'",
                other
            )),
        }
    }
}

/// An image held in memory: mime type plus raw bytes.
///
/// Bytes are reference counted so snapshots of the photo library stay cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Decode an inline base64 payload as returned by the remote API.
    pub fn from_base64(
        mime_type: impl Into<String>,
        data: &str,
    ) -> Result<Self, base64::DecodeError> {
        let bytes = general_purpose::STANDARD.decode(data.trim())?;
        Ok(Self::new(mime_type, bytes))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Convert to the transport encoding used in restoration requests.
    pub fn encode(&self) -> EncodedImage {
        EncodedImage {
            mime_type: self.mime_type.clone(),
            data: general_purpose::STANDARD.encode(&self.bytes),
        }
    }

    /// Conventional file extension for the mime type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "image/heif" => "heif",
            _ => "png",
        }
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Base64 transport form of an image, ready to embed in a request body.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data.len())
            .finish()
    }
}

/// A successfully restored image and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredImage {
    pub image: ImagePayload,
    /// Remote model identifier that produced the image.
    pub model: String,
    /// Mode in effect when the request was issued.
    pub mode: RestorationMode,
}
