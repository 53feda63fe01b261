use std::process::ExitCode;

use numera_dev::{DevConfig, run_dev_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match DevConfig::from_env() {
        Ok(config) => {
            run_dev_server(config).await;
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "invalid dev server settings");
            ExitCode::FAILURE
        }
    }
}
