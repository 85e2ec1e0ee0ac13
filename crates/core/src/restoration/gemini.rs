//! Restoration client for the Gemini `generateContent` image API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::credentials::CredentialResolver;

use super::error::RestorationError;
use super::prompts::instructions_for;
use super::traits::RestorationClient;
use super::types::{EncodedImage, ImagePayload, RestorationMode, RestoredImage};

/// Safety categories relaxed to the least restrictive threshold.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const SAFETY_THRESHOLD: &str = "BLOCK_NONE";

/// Finish reason for a normal completion.
const FINISH_STOP: &str = "STOP";

/// Finish reasons that mean the remote safety policy stopped generation.
const SAFETY_FINISH_REASONS: [&str; 6] = [
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "IMAGE_PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

/// Gemini image API client.
pub struct GeminiClient {
    client: reqwest::Client,
    credentials: CredentialResolver,
    api_base: String,
    standard_model: String,
    ultra_model: String,
    ultra_image_size: String,
    ultra_aspect_ratio: String,
}

impl GeminiClient {
    pub fn new(config: &RemoteConfig, credentials: CredentialResolver) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            credentials,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            standard_model: config.standard_model.clone(),
            ultra_model: config.ultra_model.clone(),
            ultra_image_size: config.ultra_image_size.clone(),
            ultra_aspect_ratio: config.ultra_aspect_ratio.clone(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    /// Build the request body for one image.
    fn build_request(&self, image: &EncodedImage, mode: RestorationMode) -> GenerateRequest {
        let generation_config = mode.requests_upscale().then(|| GenerationConfig {
            image_config: ImageConfig {
                image_size: self.ultra_image_size.clone(),
                aspect_ratio: self.ultra_aspect_ratio.clone(),
            },
        });

        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: RequestInlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    RequestPart::Text {
                        text: instructions_for(mode).to_string(),
                    },
                ],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: SAFETY_THRESHOLD.to_string(),
                })
                .collect(),
            generation_config,
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: RequestInlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    image_size: String,
    aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
    #[serde(default)]
    pub(crate) prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub(crate) block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<ResponseContent>,
    #[serde(default)]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default, alias = "inline_data")]
    pub(crate) inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponseInlineData {
    #[serde(alias = "mime_type")]
    pub(crate) mime_type: String,
    pub(crate) data: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// ============================================================================
// Response interpretation
// ============================================================================

/// Turn a decoded response into a restored image or a typed failure.
pub(crate) fn interpret_response(
    response: GenerateResponse,
    model: &str,
    mode: RestorationMode,
) -> Result<RestoredImage, RestorationError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(RestorationError::ContentBlocked(format!(
                "request blocked: {}",
                reason
            )));
        }
        return Err(RestorationError::EmptyResponse(
            "no candidates returned".to_string(),
        ));
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != FINISH_STOP {
            return Err(classify_finish_reason(reason));
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        return Err(RestorationError::EmptyResponse(
            "candidate has no content parts".to_string(),
        ));
    }

    for inline in parts.iter().filter_map(|p| p.inline_data.as_ref()) {
        let image = ImagePayload::from_base64(inline.mime_type.clone(), &inline.data)
            .map_err(|e| RestorationError::Unknown(format!("invalid image data: {}", e)))?;
        if image.is_empty() {
            debug!("Skipping empty {} image part", inline.mime_type);
            continue;
        }
        return Ok(RestoredImage {
            image,
            model: model.to_string(),
            mode,
        });
    }

    let text = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string();
    if !text.is_empty() {
        return Err(RestorationError::ModelRefusedText(text));
    }

    Err(RestorationError::Unknown(
        "response contained neither an image nor text".to_string(),
    ))
}

fn classify_finish_reason(reason: &str) -> RestorationError {
    if SAFETY_FINISH_REASONS.contains(&reason) {
        RestorationError::ContentBlocked(format!("generation stopped: {}", reason))
    } else {
        RestorationError::Unknown(format!("generation stopped: {}", reason))
    }
}

/// Map a non-success HTTP response to a typed failure.
fn classify_api_error(status: u16, body: &str) -> RestorationError {
    let (message, api_status) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status),
        Err(_) => (body.to_string(), None),
    };
    let detail = match &api_status {
        Some(s) => format!("{} ({}): {}", status, s, message),
        None => format!("{}: {}", status, message),
    };

    match (status, api_status.as_deref()) {
        (401 | 403, _) | (_, Some("UNAUTHENTICATED" | "PERMISSION_DENIED")) => {
            RestorationError::Auth(detail)
        }
        (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => RestorationError::Quota(detail),
        _ => match RestorationError::from_transport_message(detail.clone()) {
            RestorationError::Unknown(_) => RestorationError::Unknown(format!("API error {}", detail)),
            classified => classified,
        },
    }
}

fn classify_transport_error(err: reqwest::Error) -> RestorationError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        RestorationError::Network(err.to_string())
    } else {
        RestorationError::from_transport_message(err.to_string())
    }
}

#[async_trait]
impl RestorationClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model_for(&self, mode: RestorationMode) -> &str {
        match mode {
            RestorationMode::Standard => &self.standard_model,
            RestorationMode::Ultra => &self.ultra_model,
        }
    }

    async fn restore(
        &self,
        image: &EncodedImage,
        mode: RestorationMode,
    ) -> Result<RestoredImage, RestorationError> {
        let api_key = self
            .credentials
            .resolve()
            .map_err(|e| RestorationError::Auth(e.to_string()))?;

        let model = self.model_for(mode).to_string();
        let body = self.build_request(image, mode);

        debug!(
            "Sending {} restoration request to {} ({} bytes encoded)",
            mode,
            model,
            image.data.len()
        );

        let response = self
            .client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", api_key.expose())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &error_text));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RestorationError::EmptyResponse(format!("malformed response: {}", e)))?;

        interpret_response(decoded, &model, mode)
    }
}
