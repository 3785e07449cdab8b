//! Client configuration.
//!
//! The only recognized option is `apiBaseUrl`, the URL of the remote post
//! collection. Sources, lowest precedence first: built-in default, JSON
//! config file, `POSTS_API_BASE_URL`. Front ends apply their own override
//! (for example a command-line flag) with [`ClientConfig::with_api_base_url`].

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{PostsClientError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/posts";
pub const API_BASE_URL_ENV: &str = "POSTS_API_BASE_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Resolves configuration from file and environment. An explicit
    /// `config_file` must exist; the per-user default file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("{} overrides apiBaseUrl", API_BASE_URL_ENV);
                config.api_base_url = url;
            }
        }

        config.validated()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PostsClientError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            PostsClientError::Config(format!("invalid config file {}: {}", path.display(), e))
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        self.api_base_url = url.into();
        self.validated()
    }

    /// Checks that `api_base_url` is an absolute http(s) URL and strips
    /// trailing slashes.
    pub fn validated(mut self) -> Result<Self> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&trimmed).map_err(|e| {
            PostsClientError::Config(format!("apiBaseUrl '{}' is not a valid URL: {}", trimmed, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PostsClientError::Config(format!(
                "apiBaseUrl must use http or https, got '{}'",
                url.scheme()
            )));
        }

        self.api_base_url = trimmed;
        Ok(self)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("posts-client").join("config.json"))
}
