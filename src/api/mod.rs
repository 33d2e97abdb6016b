//! Clients for the three remote services the pipeline talks to
//!
//! Each service sits behind a trait so the fallback loop, the credential
//! state machine and the publish step can be exercised against in-memory
//! fakes. The concrete adapters translate wire-level failures into the
//! enumerated error kinds in [`crate::error`]; nothing above this layer
//! inspects error text.

pub mod blogger;
pub mod gemini;
pub mod oauth;

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, PublishError, TokenError};
use crate::models::{BackendCandidate, PublishRequest, PublishResult};

pub use blogger::BloggerClient;
pub use gemini::GeminiClient;
pub use oauth::GoogleTokenEndpoint;

/// A text-generation backend that serves several model candidates
#[allow(async_fn_in_trait)]
pub trait GenerationBackend {
    /// Ask `candidate` to answer `request`.
    ///
    /// Returns the raw text, or a failure already classified as transient
    /// or fatal.
    async fn generate(
        &self,
        candidate: &BackendCandidate,
        request: &GenerationRequest,
    ) -> Result<String, BackendError>;
}

/// An OAuth token endpoint supporting the `refresh_token` grant
#[allow(async_fn_in_trait)]
pub trait TokenEndpoint {
    /// Exchange the refresh token for a fresh access token
    async fn refresh(&self, request: &RefreshRequest<'_>) -> Result<TokenGrant, TokenError>;
}

/// A blog platform that accepts new posts
#[allow(async_fn_in_trait)]
pub trait BlogApi {
    /// Create one post. Exactly one request is made.
    async fn insert_post(
        &self,
        access_token: &str,
        blog_id: &str,
        request: &PublishRequest,
    ) -> Result<PublishResult, PublishError>;
}

/// Instruction payload plus optional sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Opaque instruction text
    pub prompt: String,
    /// Sampling and safety settings
    pub params: GenerationParams,
}

impl GenerationRequest {
    /// Request with the given prompt and settings
    pub fn new(prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            prompt: prompt.into(),
            params,
        }
    }
}

/// Optional generation settings forwarded to the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Block threshold applied to every harm category (e.g. `BLOCK_ONLY_HIGH`)
    pub safety_threshold: Option<String>,
}

/// Form fields of a `refresh_token` grant
#[derive(Clone, Copy)]
pub struct RefreshRequest<'a> {
    /// OAuth client id
    pub client_id: &'a str,
    /// OAuth client secret
    pub client_secret: &'a str,
    /// Long-lived refresh token
    pub refresh_token: &'a str,
}

impl std::fmt::Debug for RefreshRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// A newly issued access token
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    /// Bearer token for API calls
    pub access_token: String,
    /// Lifetime in seconds, when the endpoint reports one
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Limit error bodies echoed into messages
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("  short  ", 10), "short");
        assert_eq!(truncate("투자투자투자", 2), "투자…");
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let request = RefreshRequest {
            client_id: "id",
            client_secret: "shh",
            refresh_token: "1//tok",
        };
        let shown = format!("{request:?}");
        assert!(!shown.contains("shh"));
        assert!(!shown.contains("1//tok"));

        let grant = TokenGrant {
            access_token: "ya29.secret".to_string(),
            expires_in: Some(3599),
        };
        assert!(!format!("{grant:?}").contains("ya29"));
    }
}
