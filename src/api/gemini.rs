//! Gemini `generateContent` client

use anyhow::{Context, Result, bail};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendErrorKind};
use crate::models::BackendCandidate;

use super::{GenerationBackend, GenerationRequest, truncate};

/// Default Gemini REST endpoint
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client against the public endpoint
    pub fn new(api_key: &str) -> Self {
        Self::with_base(DEFAULT_API_BASE, api_key)
    }

    /// Create a client against a custom endpoint
    pub fn with_base(api_base: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    /// `generateContent` URL for one candidate; the id is a single path segment
    fn generate_url(&self, candidate: &BackendCandidate) -> String {
        self.api_url(&format!(
            "/models/{}:generateContent",
            urlencoding::encode(candidate.id())
        ))
    }

    /// List the models visible to this API key
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.api_url("/models"))
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(reqwest::Error::without_url)
                .context("Failed to list models")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                bail!("Gemini error {status}: {}", error_message(&body));
            }

            let page: ListModelsResponse = response
                .json()
                .await
                .context("Failed to parse model list")?;

            models.extend(page.models);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }
}

impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        candidate: &BackendCandidate,
        request: &GenerationRequest,
    ) -> Result<String, BackendError> {
        let url = self.generate_url(candidate);
        let body = GenerateContentRequest::from_request(request);

        tracing::debug!(
            "Calling {candidate} (prompt: {} chars)",
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BackendError::new(
                    BackendErrorKind::Other,
                    format!("request failed: {}", e.without_url()),
                )
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            BackendError::new(
                BackendErrorKind::Other,
                format!("failed to read response: {}", e.without_url()),
            )
        })?;

        if !status.is_success() {
            return Err(classify_error(status, &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            BackendError::new(
                BackendErrorKind::Other,
                format!("failed to parse response: {e}"),
            )
        })?;

        parsed.into_text()
    }
}

/// Map a non-success response to an error kind.
///
/// The API's `error.status` string wins when present; otherwise the HTTP
/// status decides.
pub fn classify_error(status: StatusCode, body: &str) -> BackendError {
    let api_status = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.status);

    let kind = match api_status.as_deref() {
        Some("RESOURCE_EXHAUSTED") => BackendErrorKind::RateLimited,
        Some("NOT_FOUND" | "UNAVAILABLE") => BackendErrorKind::Unavailable,
        Some(_) => BackendErrorKind::Other,
        None => match status {
            StatusCode::TOO_MANY_REQUESTS => BackendErrorKind::RateLimited,
            StatusCode::NOT_FOUND | StatusCode::SERVICE_UNAVAILABLE => {
                BackendErrorKind::Unavailable
            }
            _ => BackendErrorKind::Other,
        },
    };

    BackendError::new(kind, format!("{status}: {}", error_message(body)))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| truncate(body, 200))
}

// ==================== API Types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        let safety_settings = request
            .params
            .safety_threshold
            .as_deref()
            .map(|threshold| {
                HARM_CATEGORIES
                    .iter()
                    .map(|&category| SafetySetting {
                        category,
                        threshold,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: request
                .params
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
            safety_settings,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first candidate; a blank or blocked answer is an empty response
    fn into_text(self) -> Result<String, BackendError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return Ok(text);
        }

        Err(match block_reason {
            Some(reason) => BackendError::new(
                BackendErrorKind::EmptyResponse,
                format!("prompt blocked: {reason}"),
            ),
            None => BackendError::empty(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

/// A model listed by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`
    pub name: String,
    /// Human-readable name
    #[serde(default)]
    pub display_name: String,
    /// Methods such as `generateContent`
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// The id to use as a candidate (name without the `models/` prefix)
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    /// Whether the model can serve `generateContent`
    pub fn can_generate(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}
