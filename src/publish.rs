//! Draft creation on the blog platform

use crate::api::{BlogApi, TokenEndpoint};
use crate::auth::CredentialManager;
use crate::error::PublishError;
use crate::models::{PublishRequest, PublishResult};

/// Creates draft posts using a borrowed credential manager
pub struct PublishClient<'a, A, E> {
    api: A,
    credentials: &'a mut CredentialManager<E>,
    blog_id: String,
}

impl<'a, A: BlogApi, E: TokenEndpoint> PublishClient<'a, A, E> {
    /// Publish to `blog_id` through `api`
    pub fn new(api: A, credentials: &'a mut CredentialManager<E>, blog_id: impl Into<String>) -> Self {
        Self {
            api,
            credentials,
            blog_id: blog_id.into(),
        }
    }

    /// The blog platform client
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Target blog id
    pub fn blog_id(&self) -> &str {
        &self.blog_id
    }

    /// Create a post as a draft.
    ///
    /// `draft` is accepted for symmetry with the platform API but is
    /// always sent as `true`: posts are only ever filed for human review.
    /// The credential is validated first and its failure is returned
    /// unchanged. One request is made; a failure is never retried, since a
    /// retry after an ambiguous failure could leave duplicate drafts.
    pub async fn create_post(
        &mut self,
        title: &str,
        body: &str,
        tags: &[String],
        draft: bool,
    ) -> Result<PublishResult, PublishError> {
        if !draft {
            tracing::warn!("Live publishing is not supported; creating a draft instead");
        }

        let access_token = self.credentials.ensure_valid().await?;
        let request = PublishRequest::draft(title, body, tags.to_vec());

        let result = self
            .api
            .insert_post(access_token, &self.blog_id, &request)
            .await?;

        tracing::info!("Draft created: {} in blog {}", result.id, self.blog_id());
        Ok(result)
    }
}
