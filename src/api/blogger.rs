//! Blogger v3 API client

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::PublishError;
use crate::models::{PublishRequest, PublishResult};

use super::{BlogApi, truncate};

/// Default Blogger REST endpoint
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/blogger/v3";

/// Blogger API client
pub struct BloggerClient {
    client: Client,
    api_base: String,
}

impl BloggerClient {
    /// Create a client against the public endpoint
    pub fn new() -> Self {
        Self::with_base(DEFAULT_API_BASE)
    }

    /// Create a client against a custom endpoint
    pub fn with_base(api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Build the posts collection URL for a blog
    fn posts_url(&self, blog_id: &str) -> String {
        format!(
            "{}/blogs/{}/posts",
            self.api_base,
            urlencoding::encode(blog_id)
        )
    }
}

impl Default for BloggerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BlogApi for BloggerClient {
    async fn insert_post(
        &self,
        access_token: &str,
        blog_id: &str,
        request: &PublishRequest,
    ) -> Result<PublishResult, PublishError> {
        let body = InsertPostBody::new(blog_id, request);

        tracing::debug!(
            "Inserting post \"{}\" ({} chars, {} labels)",
            request.title,
            request.body.chars().count(),
            request.tags.len()
        );

        let response = self
            .client
            .post(self.posts_url(blog_id))
            .bearer_auth(access_token)
            .query(&draft_query(request))
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let post: BloggerPost = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.without_url().to_string()))?;

        Ok(PublishResult {
            id: post.id,
            url: post.url,
        })
    }
}

/// The platform reads the draft flag from the query string, not the body.
/// Only drafts are ever created, whatever the request says.
fn draft_query(request: &PublishRequest) -> [(&'static str, &'static str); 1] {
    if !request.is_draft() {
        tracing::warn!("Refusing to publish \"{}\" live; creating a draft", request.title);
    }
    [("isDraft", "true")]
}

fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| truncate(body, 200))
}

// ==================== API Types ====================

#[derive(Debug, Serialize)]
struct InsertPostBody<'a> {
    kind: &'static str,
    blog: BlogRef<'a>,
    title: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a [String]>,
}

impl<'a> InsertPostBody<'a> {
    fn new(blog_id: &'a str, request: &'a PublishRequest) -> Self {
        Self {
            kind: "blogger#post",
            blog: BlogRef { id: blog_id },
            title: &request.title,
            content: &request.body,
            labels: (!request.tags.is_empty()).then_some(request.tags.as_slice()),
        }
    }
}

#[derive(Debug, Serialize)]
struct BlogRef<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct BloggerPost {
    id: String,
    url: Option<String>,
}
