use std::{net::SocketAddr, path::PathBuf};

use numera_client::TokenDescriptor;
use numera_core::MethodKind;
use numera_plot::AppletConfig;
use serde_json::json;
use thiserror::Error;
use warp::{Filter, http::StatusCode};

const DEFAULT_PORT: u16 = 5000;

/// Settings for the development server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    /// Served by `/config`; `None` makes the endpoint answer 503.
    pub token: Option<TokenDescriptor>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DevError {
    #[error("`NUMERA_DEV_PORT` must be a port number, got `{value}`")]
    InvalidPort { value: String },
}

impl DevConfig {
    /// Reads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `NUMERA_DEV_PORT` is set but not a port number.
    pub fn from_env() -> Result<Self, DevError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`.
    ///
    /// - `NUMERA_ACCESS_TOKEN` — the credential; without it none is served
    /// - `NUMERA_TOKEN_TYPE` — defaults to `Bearer`
    /// - `NUMERA_DEV_PORT` — defaults to 5000
    /// - `NUMERA_STATIC_DIR` — defaults to this crate's `static/` directory
    ///
    /// # Errors
    ///
    /// Returns an error if the port is not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DevError> {
        let port = match lookup("NUMERA_DEV_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| DevError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };

        let token = lookup("NUMERA_ACCESS_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(|access_token| TokenDescriptor {
                token_type: lookup("NUMERA_TOKEN_TYPE").unwrap_or_else(|| "Bearer".to_owned()),
                access_token,
            });

        let static_dir = lookup("NUMERA_STATIC_DIR").map_or_else(
            || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
            PathBuf::from,
        );

        Ok(Self {
            port,
            static_dir,
            token,
        })
    }
}

/// The server's routes.
///
/// - `GET /config` — the token descriptor, or 503 when none is configured
/// - `GET /methods` — every method with its family and endpoint path
/// - `GET /applet/{method}` — the graphing-applet embed config for a method,
///   or for the function graph when `{method}` is `graph`
/// - anything else — static files
pub fn routes(
    config: &DevConfig,
) -> impl Filter<Extract = (impl warp::Reply + use<>,), Error = warp::Rejection> + Clone + use<> {
    let token = config.token.clone();
    let credential = warp::path("config")
        .and(warp::path::end())
        .and(warp::get())
        .map(move || match &token {
            Some(token) => warp::reply::with_status(warp::reply::json(token), StatusCode::OK),
            None => {
                tracing::warn!("credential requested but none is configured");
                warp::reply::with_status(
                    warp::reply::json(&json!({ "detail": "no credential configured" })),
                    StatusCode::SERVICE_UNAVAILABLE,
                )
            }
        });

    let methods = warp::path("methods")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            let listing: Vec<_> = MethodKind::ALL
                .iter()
                .map(|kind| {
                    json!({
                        "slug": kind.slug(),
                        "name": kind.name(),
                        "family": kind.family().to_string(),
                        "path": kind.path(),
                    })
                })
                .collect();
            warp::reply::json(&listing)
        });

    let applet = warp::path!("applet" / String)
        .and(warp::get())
        .map(|slug: String| {
            let config = if slug == "graph" {
                Ok(AppletConfig::graphing())
            } else {
                slug.parse::<MethodKind>()
                    .map(|kind| AppletConfig::for_family(kind.family()))
            };
            match config {
                Ok(config) => {
                    warp::reply::with_status(warp::reply::json(&config), StatusCode::OK)
                }
                Err(error) => warp::reply::with_status(
                    warp::reply::json(&json!({ "detail": error.to_string() })),
                    StatusCode::NOT_FOUND,
                ),
            }
        });

    let static_files = warp::fs::dir(config.static_dir.clone());

    credential
        .or(methods)
        .or(applet)
        .or(static_files)
        .with(warp::trace::request())
}

/// Runs the development server until the process is stopped.
pub async fn run_dev_server(config: DevConfig) {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    if config.token.is_none() {
        tracing::warn!("NUMERA_ACCESS_TOKEN is not set; /config will answer 503");
    }
    tracing::info!(%addr, static_dir = %config.static_dir.display(), "dev server running");
    warp::serve(routes(&config)).run(addr).await;
}
