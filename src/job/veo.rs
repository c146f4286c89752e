// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! REST client for the Gemini API video (Veo) and text endpoints.
//!
//! Video generation is a long-running operation: `predictLongRunning`
//! returns an operation name, the operation is polled until `done`, and the
//! finished sample is downloaded from the returned URI. The text endpoint
//! backs the director's prompt suggestions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::backend::{BackendError, Operation, VideoBackend};
use super::credentials::KeyStore;
use crate::models::director::DirectorSettings;
use crate::models::generation::{GenerationRequest, ImagePayload};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the generative backend.
pub struct GenAiClient {
    client: reqwest::Client,
    base_url: String,
    video_model: String,
    text_model: String,
    keys: Arc<KeyStore>,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Instance<'a> {
    prompt: &'a str,
    image: InlineImage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_frame: Option<InlineImage<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage<'a> {
    bytes_base64_encoded: &'a str,
    mime_type: &'a str,
}

impl<'a> From<&'a ImagePayload> for InlineImage<'a> {
    fn from(payload: &'a ImagePayload) -> Self {
        Self {
            bytes_base64_encoded: &payload.data,
            mime_type: &payload.mime_type,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    aspect_ratio: &'a str,
    resolution: &'a str,
    sample_count: u32,
}

#[derive(Deserialize, Debug)]
struct OperationStatus {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
    error: Option<ErrorDetail>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize, Debug)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Deserialize, Debug)]
struct VideoRef {
    uri: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl OperationStatus {
    fn into_operation(self) -> Result<Operation, BackendError> {
        if let Some(error) = self.error {
            return Err(BackendError::Operation(error.message));
        }
        let video_uri = self
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);
        Ok(Operation {
            name: self.name,
            done: self.done,
            video_uri,
        })
    }
}

impl GenAiClient {
    pub fn new(base_url: String, video_model: String, text_model: String, keys: Arc<KeyStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            video_model,
            text_model,
            keys,
        }
    }

    /// Ask the text model to rewrite a rough idea into a video prompt.
    pub async fn suggest_prompt(
        &self,
        idea: &str,
        settings: &DirectorSettings,
    ) -> Result<String, BackendError> {
        let instruction = suggestion_instruction(idea, settings);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &instruction }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.text_model
            ))
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateContentResponse = Self::parse_response(response).await?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::Operation(
                "the director returned an empty suggestion".to_string(),
            ));
        }
        Ok(text.to_string())
    }

    fn api_key(&self) -> Result<String, BackendError> {
        self.keys.api_key().ok_or(BackendError::MissingKey)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning failures into
    /// [`BackendError::Api`] with the backend's own error message.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl VideoBackend for GenAiClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation, BackendError> {
        let body = predict_request(request);
        let response = self
            .client
            .post(format!(
                "{}/models/{}:predictLongRunning",
                self.base_url, self.video_model
            ))
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&body)
            .send()
            .await?;

        let status: OperationStatus = Self::parse_response(response).await?;
        status.into_operation()
    }

    async fn poll(&self, operation: &Operation) -> Result<Operation, BackendError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, operation.name))
            .header(API_KEY_HEADER, self.api_key()?)
            .send()
            .await?;

        let status: OperationStatus = Self::parse_response(response).await?;
        status.into_operation()
    }

    async fn fetch(&self, video_uri: &str) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .get(video_uri)
            .header(API_KEY_HEADER, self.api_key()?)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn predict_request(request: &GenerationRequest) -> PredictRequest<'_> {
    PredictRequest {
        instances: vec![Instance {
            prompt: &request.prompt,
            image: (&request.start_image).into(),
            last_frame: request.end_image.as_ref().map(InlineImage::from),
        }],
        parameters: Parameters {
            aspect_ratio: request.aspect_ratio.as_str(),
            resolution: request.resolution.as_str(),
            sample_count: 1,
        },
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

fn suggestion_instruction(idea: &str, settings: &DirectorSettings) -> String {
    let mut instruction = String::from(
        "You are a film director writing a prompt for an image-to-video model. \
         Rewrite the idea below as one vivid paragraph describing subject, action, \
         lighting and mood. Reply with the prompt text only.",
    );
    instruction.push_str("\n\nIdea: ");
    instruction.push_str(idea.trim());
    if settings.advanced {
        instruction.push_str("\nCamera: ");
        instruction.push_str(settings.camera_angle.phrase());
        instruction.push_str("\nMotion: ");
        instruction.push_str(settings.motion_style.phrase());
    }
    instruction.push_str("\nFormat: ");
    instruction.push_str(settings.aspect_ratio.as_str());
    instruction
}
