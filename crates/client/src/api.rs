use std::sync::Arc;

use numera_core::Method;
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{Authorizer, ClientConfig};

/// Posts method payloads to the numerical-methods service.
///
/// Cloning is cheap; clones share the connection pool and the credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    auth: Arc<Authorizer>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let http = reqwest::Client::new();
        let auth = Authorizer::new(http.clone(), config.config_url.clone());
        Self {
            http,
            config: Arc::new(config.clone()),
            auth: Arc::new(auth),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn authorizer(&self) -> &Authorizer {
        &self.auth
    }

    /// Posts the request to the method's endpoint.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn call<M: Method>(&self, request: &M::Request) -> Result<Value, ApiError> {
        self.post(M::PATH, request).await
    }

    /// Posts the request to the method's follow-up endpoint, if it has one.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn follow_up<M: Method>(
        &self,
        request: &M::Request,
    ) -> Option<Result<Value, ApiError>> {
        match M::FOLLOW_UP {
            Some(path) => Some(self.post(path, request).await),
            None => None,
        }
    }

    /// Posts a JSON payload to `path` under the API base.
    ///
    /// The credential is resolved on first use. If it cannot be loaded, the
    /// request is sent without an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded, the request fails
    /// in transit, the service answers with a non-success status, or the
    /// success body is not JSON.
    pub async fn post<P>(&self, path: &str, payload: &P) -> Result<Value, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        let body = serde_json::to_vec(payload).map_err(ApiError::Encode)?;

        let mut request = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(authorization) = self.auth.resolve().await {
            request = request.header(header::AUTHORIZATION, authorization);
        }

        tracing::debug!(%url, "posting method request");
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            let error = ApiError::from_failure(status, &bytes);
            tracing::warn!(%url, status = status.as_u16(), %error, "service rejected request");
            return Err(error);
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|source| ApiError::Decode { url: url.clone(), source })?;
        tracing::info!(%url, status = status.as_u16(), "service answered");
        Ok(value)
    }
}

/// A failed call to the service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service explained the failure in its `detail` field.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// The service failed without a usable explanation.
    #[error("request failed with status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The text shown to the user for this error.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The HTTP status the service answered with, if it answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds the error for a non-success response.
    ///
    /// A string `detail` is used verbatim. A list of `{msg}` objects is
    /// joined with `"; "`. Anything else falls back to the status text.
    #[must_use]
    pub fn from_failure(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.detail.into_message());

        match detail {
            Some(detail) => Self::Rejected {
                status: status.as_u16(),
                detail,
            },
            None => Self::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown status").to_owned(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Debug, Deserialize)]
struct DetailItem {
    msg: String,
}

impl Detail {
    fn into_message(self) -> Option<String> {
        let message = match self {
            Self::Text(text) => text,
            Self::Items(items) => items
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; "),
        };
        (!message.trim().is_empty()).then_some(message)
    }
}
