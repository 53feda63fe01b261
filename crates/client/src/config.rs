use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Default base URL of the numerical-methods service.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1.5.0/backend_numerical_methods";

/// Default URL of the local configuration endpoint.
pub const DEFAULT_CONFIG_URL: &str = "http://localhost:5000/config";

const API_BASE_VAR: &str = "NUMERA_API_BASE";
const CONFIG_URL_VAR: &str = "NUMERA_CONFIG_URL";

/// Where the client sends requests and fetches its credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL every method path is appended to.
    pub api_base: String,
    /// Endpoint answering with a [`TokenDescriptor`].
    pub config_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            config_url: DEFAULT_CONFIG_URL.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Parses a configuration from TOML, filling absent keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, carries unknown keys,
    /// or sets a blank URL.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()
    }

    /// Loads the configuration from an optional TOML file, then applies
    /// `NUMERA_API_BASE` and `NUMERA_CONFIG_URL` from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };

        config
            .with_overrides(|key| std::env::var(key).ok())
            .validate()
    }

    /// Replaces fields with values produced by `lookup` for the override keys.
    ///
    /// Blank values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let apply = |key: &str, field: &mut String| {
            if let Some(value) = lookup(key).filter(|value| !value.trim().is_empty()) {
                tracing::debug!(key, %value, "overriding client setting");
                *field = value.trim().to_owned();
            }
        };
        apply(API_BASE_VAR, &mut self.api_base);
        apply(CONFIG_URL_VAR, &mut self.config_url);
        self
    }

    /// Returns the full URL for an endpoint path.
    ///
    /// The service expects a trailing slash on every endpoint.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/",
            self.api_base.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Blank { key: "api_base" });
        }
        if self.config_url.trim().is_empty() {
            return Err(ConfigError::Blank { key: "config_url" });
        }
        Ok(self)
    }
}

/// Credential descriptor served by the configuration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub token_type: String,
    pub access_token: String,
}

impl TokenDescriptor {
    /// Returns the `Authorization` header value, `"<token_type> <access_token>"`.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid client configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`{key}` must not be blank")]
    Blank { key: &'static str },

    #[error("configuration request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("configuration endpoint {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("configuration from {url} is not a token descriptor: {source}")]
    Malformed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Lazily resolved `Authorization` header value.
///
/// The configuration endpoint is fetched at most once. A failed fetch is
/// logged and remembered as "no credential"; later requests go out without
/// an `Authorization` header and the service decides how to answer.
#[derive(Debug)]
pub struct Authorizer {
    http: reqwest::Client,
    config_url: String,
    header: OnceCell<Option<String>>,
}

impl Authorizer {
    #[must_use]
    pub fn new(http: reqwest::Client, config_url: impl Into<String>) -> Self {
        Self {
            http,
            config_url: config_url.into(),
            header: OnceCell::new(),
        }
    }

    /// Returns the header value, fetching it on first use.
    pub async fn resolve(&self) -> Option<&str> {
        self.header
            .get_or_init(|| async {
                match self.fetch().await {
                    Ok(token) => {
                        tracing::info!(url = %self.config_url, "loaded service credential");
                        Some(token.authorization())
                    }
                    Err(error) => {
                        tracing::error!(%error, "failed to load service credential");
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    /// Returns `true` once a fetch has completed, successfully or not.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.header.initialized()
    }

    /// Fetches the token descriptor without caching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable, answers with a
    /// non-success status, or does not return a token descriptor.
    pub async fn fetch(&self) -> Result<TokenDescriptor, ConfigError> {
        let url = self.config_url.clone();
        tracing::debug!(%url, "fetching service credential");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ConfigError::Fetch {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|source| ConfigError::Malformed { url, source })
    }
}
