//! Data models for the draft pipeline

mod candidate;
mod content;
mod post;

pub use candidate::{BackendCandidate, GenerationResult};
pub use content::ParsedContent;
pub use post::{PublishRequest, PublishResult};
