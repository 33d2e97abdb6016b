//! Publish request and result

use serde::{Deserialize, Serialize};

/// A post about to be created on the blog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Post title
    pub title: String,
    /// HTML body
    pub body: String,
    /// Labels to attach (omitted on the wire when empty)
    pub tags: Vec<String>,
    #[serde(default = "always_draft")]
    draft: bool,
}

const fn always_draft() -> bool {
    true
}

impl PublishRequest {
    /// Build a draft request. There is no constructor for a live post.
    pub fn draft(title: impl Into<String>, body: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tags,
            draft: true,
        }
    }

    /// Whether the request asks for a draft (true unless deserialized otherwise)
    pub const fn is_draft(&self) -> bool {
        self.draft
    }
}

/// The created draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    /// Platform post id
    pub id: String,
    /// Public URL (live only once a human publishes the draft)
    pub url: Option<String>,
}
