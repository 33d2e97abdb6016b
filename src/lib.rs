//! # Autoblog
//!
//! Generate a long-form article with Gemini and file it as a Blogger draft.
//!
//! ## Overview
//!
//! One run picks a topic (or asks the model for one), generates an HTML
//! article by trying each configured model in order, cleans the output,
//! extracts a title and tags, and creates an unpublished draft for a
//! human to review. Nothing is ever published live.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Pipeline                            │
//! │      topic → generate → post-process → create draft         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   Generation    │ │  Post-process   │ │     Publish     │
//! │                 │ │                 │ │                 │
//! │ • Candidates    │ │ • Strip fences  │ │ • Draft only    │
//! │ • Fallback loop │ │ • Title         │ │ • Single call   │
//! │ • Topic pick    │ │ • Tags          │ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                                       │
//!          ▼                                       ▼
//! ┌─────────────────┐                     ┌─────────────────┐
//! │   API: Gemini   │                     │      Auth       │
//! │                 │                     │                 │
//! │ • generate      │                     │ • Refresh grant │
//! │ • list models   │                     │ • State machine │
//! └─────────────────┘                     └─────────────────┘
//!                                                  │
//!                                                  ▼
//!                                ┌───────────────────────────────┐
//!                                │ API: OAuth token, Blogger v3  │
//!                                └───────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Backend traits and HTTP clients (Gemini, OAuth, Blogger)
//! - [`auth`] - Credential lifecycle
//! - [`config`] - Config file and environment secrets
//! - [`error`] - Error types and operator hints
//! - [`generation`] - Candidate fallback and topic recommendation
//! - [`models`] - Data models
//! - [`pipeline`] - End-to-end run
//! - [`postprocess`] - Fence stripping, title and tag extraction
//! - [`prompts`] - Prompt text
//! - [`publish`] - Draft creation
//!
//! ## Example
//!
//! ```no_run
//! use autoblog::api::{BloggerClient, GeminiClient, GoogleTokenEndpoint};
//! use autoblog::{Config, CredentialManager, GenerationClient, Pipeline, PublishClient, Secrets};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let secrets = Secrets::from_env().require_all()?;
//!
//! let generator = GenerationClient::new(
//!     GeminiClient::new(&secrets.gemini_api_key),
//!     config.candidates.clone(),
//! )?;
//! let mut credentials = CredentialManager::new(secrets.oauth, GoogleTokenEndpoint::new())?;
//! let publisher = PublishClient::new(BloggerClient::new(), &mut credentials, secrets.blog_id);
//!
//! let report = Pipeline::new(generator, publisher).run(None).await?;
//! println!("Draft {} created", report.post.id);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/autoblog/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::ref_option)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod pipeline;
pub mod postprocess;
pub mod prompts;
pub mod publish;

// Re-export main types for convenience
pub use auth::{AuthState, CredentialManager, OAuthSecrets};
pub use config::{Config, RunSecrets, Secrets};
pub use error::{Error, Result};
pub use generation::GenerationClient;
pub use models::{BackendCandidate, GenerationResult, ParsedContent, PublishRequest, PublishResult};
pub use pipeline::{Pipeline, RunReport};
pub use publish::PublishClient;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
