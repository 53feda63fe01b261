//! HTTP client for the Numera numerical-methods service.
//!
//! - [`ClientConfig`] — where the service and the local `/config` endpoint live
//! - [`Authorizer`] — fetches the bearer credential once, on first use
//! - [`ApiClient`] — posts method payloads and normalizes failures into
//!   [`ApiError`]
//!
//! # Example
//!
//! ```no_run
//! use numera_client::{ApiClient, ClientConfig};
//! use numera_core::{Form, Method, method::root::Bisection};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ClientConfig::default());
//! let form = Form::new()
//!     .with_field("expression", "x**2 - 4")
//!     .with_field("initial", "0")
//!     .with_field("final", "28")
//!     .with_field("tolerance", "1e-7")
//!     .with_field("max_iterations", "100")
//!     .with_field("error_type", "absolute");
//!
//! let request = Bisection::extract(&form)?;
//! let body = client.call::<Bisection>(&request).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod api;
mod config;

pub use api::{ApiClient, ApiError};
pub use config::{Authorizer, ClientConfig, ConfigError, TokenDescriptor};
