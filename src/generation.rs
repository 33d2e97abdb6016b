//! Text generation with ordered fallback across backend candidates

use crate::api::{GenerationBackend, GenerationParams, GenerationRequest};
use crate::error::{BackendError, ConfigError, GenerationError};
use crate::models::{BackendCandidate, GenerationResult};
use crate::prompts;

/// Topic used when recommendation fails
pub const DEFAULT_TOPIC: &str = "NVIDIA (NVDA)";

/// Outcome of one candidate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Non-empty text; stop here
    Success(String),
    /// Try the next candidate
    Transient(BackendError),
    /// Stop without trying the rest
    Fatal(BackendError),
}

impl Attempt {
    /// Classify a raw backend result. Blank text counts as an empty response.
    pub fn classify(result: Result<String, BackendError>) -> Self {
        match result {
            Ok(text) if !text.trim().is_empty() => Self::Success(text),
            Ok(_) => Self::Transient(BackendError::empty()),
            Err(err) if err.kind.is_transient() => Self::Transient(err),
            Err(err) => Self::Fatal(err),
        }
    }
}

/// Try `candidates` in order until one returns text.
///
/// Transient failures move on to the next candidate; the first fatal
/// failure ends the loop. Calls are strictly sequential.
pub async fn generate_with_fallback<B: GenerationBackend>(
    backend: &B,
    candidates: &[BackendCandidate],
    request: &GenerationRequest,
) -> Result<GenerationResult, GenerationError> {
    let mut failures = Vec::new();

    for candidate in candidates {
        match Attempt::classify(backend.generate(candidate, request).await) {
            Attempt::Success(text) => {
                tracing::info!("{candidate} returned {} chars", text.chars().count());
                return Ok(GenerationResult {
                    text,
                    candidate: candidate.clone(),
                });
            }
            Attempt::Transient(err) => {
                tracing::warn!("{candidate} {err}; trying next candidate");
                failures.push((candidate.clone(), err));
            }
            Attempt::Fatal(err) => {
                tracing::error!("{candidate} failed: {err}");
                return Err(GenerationError::Fatal {
                    candidate: candidate.clone(),
                    source: err,
                });
            }
        }
    }

    Err(GenerationError::Exhausted { failures })
}

/// Generation front end holding the fixed candidate order
pub struct GenerationClient<B> {
    backend: B,
    candidates: Vec<BackendCandidate>,
    params: GenerationParams,
    default_topic: String,
}

impl<B: GenerationBackend> GenerationClient<B> {
    /// Create a client; the candidate list must not be empty.
    pub fn new(backend: B, candidates: Vec<BackendCandidate>) -> Result<Self, ConfigError> {
        if candidates.is_empty() {
            return Err(ConfigError::NoCandidates);
        }

        Ok(Self {
            backend,
            candidates,
            params: GenerationParams::default(),
            default_topic: DEFAULT_TOPIC.to_string(),
        })
    }

    /// Set sampling and safety settings
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Set the topic returned when recommendation fails
    pub fn with_default_topic(mut self, topic: impl Into<String>) -> Self {
        self.default_topic = topic.into();
        self
    }

    /// Candidates in priority order
    pub fn candidates(&self) -> &[BackendCandidate] {
        &self.candidates
    }

    /// The underlying backend
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Generate the article for `topic`.
    pub async fn generate(&self, topic: &str) -> Result<GenerationResult, GenerationError> {
        let request = GenerationRequest::new(prompts::article(topic), self.params.clone());
        generate_with_fallback(&self.backend, &self.candidates, &request).await
    }

    /// Ask for a topic. Best effort: any failure yields the default topic.
    pub async fn recommend_topic(&self) -> String {
        let request = GenerationRequest::new(prompts::recommendation(), self.params.clone());

        match generate_with_fallback(&self.backend, &self.candidates, &request).await {
            Ok(result) => match clean_topic(&result.text) {
                Some(topic) => topic,
                None => self.default_topic.clone(),
            },
            Err(e) => {
                tracing::warn!("Topic recommendation failed ({e}); using \"{}\"", self.default_topic);
                self.default_topic.clone()
            }
        }
    }
}

/// First non-blank line with stray quoting removed
fn clean_topic(text: &str) -> Option<String> {
    text.lines()
        .map(|line| line.trim().trim_matches(['"', '*', '`']).trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
