//! Post-processed article content

use serde::{Deserialize, Serialize};

/// Cleaned article with the fields extracted from its markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedContent {
    /// Post title (first `<h1>`, or the topic when there is none)
    pub title: String,
    /// HTML body with code fences removed
    pub body: String,
    /// Unique tags in first-occurrence order, never hex color codes
    pub tags: Vec<String>,
}
