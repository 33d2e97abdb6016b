//! Error types for the draft pipeline
//!
//! Each component has its own enum; [`Error`] joins them for the
//! orchestrator. Only [`BackendErrorKind::is_transient`] failures are
//! recovered (by the candidate fallback loop); everything else reaches
//! the caller.

use thiserror::Error;

use crate::models::BackendCandidate;

/// Result alias for pipeline-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure that ends a run
#[derive(Error, Debug)]
pub enum Error {
    /// Required setting absent or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No candidate produced text
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Credential could not be validated
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The draft could not be created
    #[error("Publish failed: {0}")]
    Publish(PublishError),
}

impl From<PublishError> for Error {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Auth(auth) => Self::Auth(auth),
            other => Self::Publish(other),
        }
    }
}

impl Error {
    /// Operator-facing remediation for errors that have one
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Config(ConfigError::MissingSecrets(_)) => Some(
                "Set the listed variables in the environment (or CI secrets) and run again.",
            ),
            Self::Config(ConfigError::NoCandidates) => {
                Some("Add at least one model id to `candidates` in config.toml.")
            }
            Self::Generation(GenerationError::Exhausted { .. }) => Some(
                "Every model was rate-limited, unavailable or returned nothing. Check the API key's quota, pass a topic explicitly to skip the recommendation call, or retry later.",
            ),
            Self::Generation(GenerationError::Fatal { .. }) => None,
            Self::Auth(AuthError::InvalidGrant(_)) => Some(
                "The refresh token has expired or was revoked. Authorize again to obtain a new REFRESH_TOKEN and update your secrets. Apps left in OAuth 'Testing' mode get tokens that expire after 7 days.",
            ),
            Self::Auth(AuthError::Refresh(_)) => {
                Some("The token endpoint could not be reached. Nothing was published; run again later.")
            }
            Self::Publish(_) => Some(
                "No automatic retry is made, to avoid duplicate drafts. Check the blog's draft list before running again.",
            ),
        }
    }
}

/// Configuration problems, all detected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required secrets are unset or empty
    #[error("missing required settings: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),

    /// The backend candidate list is empty
    #[error("no generation candidates configured")]
    NoCandidates,
}

/// How a single backend call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorKind {
    /// Quota or rate limit exceeded
    RateLimited,
    /// Model not found or temporarily unavailable
    Unavailable,
    /// Call succeeded but carried no text
    EmptyResponse,
    /// Anything else: auth, malformed request, transport
    Other,
}

impl BackendErrorKind {
    /// Whether the next candidate should be tried
    pub const fn is_transient(self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Short label for logs
    pub const fn label(self) -> &'static str {
        match self {
            Self::RateLimited => "rate limited",
            Self::Unavailable => "unavailable",
            Self::EmptyResponse => "empty response",
            Self::Other => "error",
        }
    }
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified failure from one generation backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct BackendError {
    /// Classification used by the fallback loop
    pub kind: BackendErrorKind,
    /// Backend-provided detail
    pub message: String,
}

impl BackendError {
    /// Build an error of the given kind
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`BackendErrorKind::EmptyResponse`]
    pub fn empty() -> Self {
        Self::new(BackendErrorKind::EmptyResponse, "no text in response")
    }
}

/// Failure of the whole candidate fallback loop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A non-transient failure stopped the loop early
    #[error("{candidate} failed: {source}")]
    Fatal {
        /// Candidate whose call failed
        candidate: BackendCandidate,
        /// The classified failure
        source: BackendError,
    },

    /// Every candidate failed transiently
    #[error("all {} candidates exhausted ({})", .failures.len(), summarize(.failures))]
    Exhausted {
        /// Each candidate with the transient failure it returned, in call order
        failures: Vec<(BackendCandidate, BackendError)>,
    },
}

fn summarize(failures: &[(BackendCandidate, BackendError)]) -> String {
    failures
        .iter()
        .map(|(candidate, err)| format!("{candidate}: {}", err.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure reported by an OAuth token endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Refresh token expired or revoked
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// Transport failure or any other error code
    #[error("{0}")]
    Other(String),
}

/// Credential could not be made valid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Fatal: needs manual re-authorization
    #[error("refresh token rejected (invalid_grant: {0}); manual re-authorization required")]
    InvalidGrant(String),

    /// Refresh failed for another reason; a later attempt may succeed
    #[error("token refresh failed: {0}")]
    Refresh(String),
}

/// Failure creating the draft
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Credential failure, propagated unchanged
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The platform rejected the request
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },

    /// Request never completed
    #[error("request failed: {0}")]
    Transport(String),

    /// Success status but an unreadable body
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}
