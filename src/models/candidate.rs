//! Generation backend candidates

use serde::{Deserialize, Serialize};

/// One named generation backend (a model id such as `gemini-2.5-flash`)
///
/// Candidates are tried in declaration order; the order is fixed
/// configuration, never runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendCandidate(String);

impl BackendCandidate {
    /// Create a candidate from a model id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The model id as sent to the backend
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BackendCandidate {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for BackendCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw text returned by the first candidate that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Generated text, exactly as the backend returned it
    pub text: String,
    /// The candidate that produced it
    pub candidate: BackendCandidate,
}
