//! One end-to-end run: topic, generation, cleaning, draft

use crate::api::{BlogApi, GenerationBackend, TokenEndpoint};
use crate::error::Result;
use crate::generation::GenerationClient;
use crate::models::{BackendCandidate, PublishResult};
use crate::postprocess;
use crate::publish::PublishClient;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Topic written about
    pub topic: String,
    /// Candidate that produced the article
    pub candidate: BackendCandidate,
    /// Extracted title
    pub title: String,
    /// Extracted tags
    pub tags: Vec<String>,
    /// The created draft
    pub post: PublishResult,
}

/// Sequences the generation and publish clients
pub struct Pipeline<'a, B, A, E> {
    generator: GenerationClient<B>,
    publisher: PublishClient<'a, A, E>,
}

impl<'a, B, A, E> Pipeline<'a, B, A, E>
where
    B: GenerationBackend,
    A: BlogApi,
    E: TokenEndpoint,
{
    /// Wire the two clients together
    pub const fn new(generator: GenerationClient<B>, publisher: PublishClient<'a, A, E>) -> Self {
        Self {
            generator,
            publisher,
        }
    }

    /// The generation client
    pub const fn generator(&self) -> &GenerationClient<B> {
        &self.generator
    }

    /// The publish client
    pub const fn publisher(&self) -> &PublishClient<'a, A, E> {
        &self.publisher
    }

    /// Run once. A blank or absent topic is replaced by a recommended one.
    ///
    /// Every failure past topic selection ends the run; the draft is
    /// only created once the article has been generated and cleaned.
    pub async fn run(&mut self, topic: Option<&str>) -> Result<RunReport> {
        let topic = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => topic.to_string(),
            None => {
                tracing::info!("No topic given; asking for a recommendation");
                self.generator.recommend_topic().await
            }
        };
        tracing::info!(
            "Topic: {topic} ({} candidates, blog {})",
            self.generator.candidates().len(),
            self.publisher.blog_id()
        );

        let generated = self.generator.generate(&topic).await?;
        let content = postprocess::process(&generated.text, &topic);
        tracing::info!(
            "Parsed \"{}\" ({} chars, {} tags)",
            content.title,
            content.body.chars().count(),
            content.tags.len()
        );

        let post = self
            .publisher
            .create_post(&content.title, &content.body, &content.tags, true)
            .await?;

        Ok(RunReport {
            topic,
            candidate: generated.candidate,
            title: content.title,
            tags: content.tags,
            post,
        })
    }
}
