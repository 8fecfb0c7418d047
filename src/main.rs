//! Entry point for the On-Road Engine binary.
//!
//! Running this binary starts an HTTP server exposing the on-road
//! price calculator.  See [`onroad_engine::config`] for the
//! environment variables it reads.

use onroad_engine::config::ServerConfig;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();
    tracing::debug!(?config, "starting on-road price server");

    match onroad_engine::api::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Error running server: {err:#}");
            ExitCode::FAILURE
        }
    }
}
