//! Configuration: tunables from `config.toml`, secrets from the environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::{GenerationParams, blogger, gemini, oauth};
use crate::auth::OAuthSecrets;
use crate::error::ConfigError;
use crate::generation::DEFAULT_TOPIC;
use crate::models::BackendCandidate;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "AUTOBLOG_CONFIG";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model candidates in priority order
    #[serde(default = "default_candidates")]
    pub candidates: Vec<BackendCandidate>,

    /// Topic used when recommendation fails
    #[serde(default = "default_topic")]
    pub default_topic: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,

    /// Block threshold for every harm category
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: Option<String>,

    /// Gemini REST base URL
    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,

    /// OAuth token endpoint
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    /// Blogger REST base URL
    #[serde(default = "default_blogger_api_base")]
    pub blogger_api_base: String,
}

fn default_candidates() -> Vec<BackendCandidate> {
    [
        "gemini-3-flash-preview",
        "gemini-2.5-flash",
        "gemini-flash-latest",
        "gemini-2.5-flash-lite",
    ]
    .into_iter()
    .map(BackendCandidate::from)
    .collect()
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_temperature() -> Option<f32> {
    Some(0.7)
}

#[allow(clippy::unnecessary_wraps)]
fn default_safety_threshold() -> Option<String> {
    Some("BLOCK_ONLY_HIGH".to_string())
}

fn default_gemini_api_base() -> String {
    gemini::DEFAULT_API_BASE.to_string()
}

fn default_token_endpoint() -> String {
    oauth::DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_blogger_api_base() -> String {
    blogger::DEFAULT_API_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            default_topic: default_topic(),
            temperature: default_temperature(),
            safety_threshold: default_safety_threshold(),
            gemini_api_base: default_gemini_api_base(),
            token_endpoint: default_token_endpoint(),
            blogger_api_base: default_blogger_api_base(),
        }
    }
}

impl Config {
    /// Get the config file path (`$AUTOBLOG_CONFIG` or `~/.config/autoblog/config.toml`)
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("autoblog");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default path or fall back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Generation settings derived from this config
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            safety_threshold: self.safety_threshold.clone(),
        }
    }
}

/// Secrets read from the environment.
///
/// Each has a primary name and a legacy alias; empty values count as unset.
#[derive(Clone, Default)]
pub struct Secrets {
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// OAuth refresh token
    pub refresh_token: Option<String>,
    /// Target blog id
    pub blog_id: Option<String>,
}

/// An environment variable with its legacy alias
struct Var {
    names: [&'static str; 2],
    label: &'static str,
}

const GEMINI_API_KEY: Var = Var {
    names: ["GEMINI_API_KEY", "GOOGLE_API_KEY"],
    label: "GEMINI_API_KEY/GOOGLE_API_KEY",
};
const CLIENT_ID: Var = Var {
    names: ["CLIENT_ID", "BLOGGER_CLIENT_ID"],
    label: "CLIENT_ID/BLOGGER_CLIENT_ID",
};
const CLIENT_SECRET: Var = Var {
    names: ["CLIENT_SECRET", "BLOGGER_CLIENT_SECRET"],
    label: "CLIENT_SECRET/BLOGGER_CLIENT_SECRET",
};
const REFRESH_TOKEN: Var = Var {
    names: ["REFRESH_TOKEN", "BLOGGER_REFRESH_TOKEN"],
    label: "REFRESH_TOKEN/BLOGGER_REFRESH_TOKEN",
};
const BLOG_ID: Var = Var {
    names: ["BLOG_ID", "BLOGGER_BLOG_ID"],
    label: "BLOG_ID/BLOGGER_BLOG_ID",
};

/// Everything a full run needs, all present
pub struct RunSecrets {
    /// Gemini API key
    pub gemini_api_key: String,
    /// OAuth secrets
    pub oauth: OAuthSecrets,
    /// Target blog id
    pub blog_id: String,
}

impl Secrets {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through an arbitrary lookup (primary name first, then alias)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &Var| {
            var.names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        Self {
            gemini_api_key: get(&GEMINI_API_KEY),
            client_id: get(&CLIENT_ID),
            client_secret: get(&CLIENT_SECRET),
            refresh_token: get(&REFRESH_TOKEN),
            blog_id: get(&BLOG_ID),
        }
    }

    /// The Gemini key alone (for listing models)
    pub fn gemini_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSecrets(vec![GEMINI_API_KEY.label]))
    }

    /// The OAuth secrets alone (for checking auth)
    pub fn oauth(&self) -> Result<OAuthSecrets, ConfigError> {
        check(&[
            (&CLIENT_ID, &self.client_id),
            (&CLIENT_SECRET, &self.client_secret),
            (&REFRESH_TOKEN, &self.refresh_token),
        ])?;

        Ok(OAuthSecrets::new(
            self.client_id.clone().unwrap_or_default(),
            self.client_secret.clone().unwrap_or_default(),
            self.refresh_token.clone().unwrap_or_default(),
        ))
    }

    /// All secrets, or every missing name at once
    pub fn require_all(&self) -> Result<RunSecrets, ConfigError> {
        check(&[
            (&GEMINI_API_KEY, &self.gemini_api_key),
            (&CLIENT_ID, &self.client_id),
            (&CLIENT_SECRET, &self.client_secret),
            (&REFRESH_TOKEN, &self.refresh_token),
            (&BLOG_ID, &self.blog_id),
        ])?;

        Ok(RunSecrets {
            gemini_api_key: self.gemini_api_key.clone().unwrap_or_default(),
            oauth: self.oauth()?,
            blog_id: self.blog_id.clone().unwrap_or_default(),
        })
    }
}

fn check(vars: &[(&Var, &Option<String>)]) -> Result<(), ConfigError> {
    let missing: Vec<_> = vars
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(var, _)| var.label)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingSecrets(missing))
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("gemini_api_key", &set(&self.gemini_api_key))
            .field("client_id", &set(&self.client_id))
            .field("client_secret", &set(&self.client_secret))
            .field("refresh_token", &set(&self.refresh_token))
            .field("blog_id", &set(&self.blog_id))
            .finish()
    }
}
