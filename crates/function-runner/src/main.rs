//! Function runner - executes a configured IoT function pipeline
//!
//! Loads the pipeline named by `RUNNER_PIPELINE_PATH` and serves it over HTTP
//! alongside the function catalog and Prometheus metrics.

use anyhow::{Context, Result};
use function_lib::{BaselineEngine, FunctionRegistry, Pipeline, StructuredLogger};
use function_runner::{api, config::RunnerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const RUNNER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting function-runner");

    let config = RunnerConfig::load()?;
    info!(node_name = %config.node_name, port = config.port, "Runner configured");

    let registry = Arc::new(FunctionRegistry::with_builtins());
    let pipeline_config = config.pipeline()?;
    let pipeline = Pipeline::from_config(
        config.node_name.clone(),
        &registry,
        &pipeline_config,
        Arc::new(BaselineEngine),
    )
    .context("Failed to build pipeline")?;

    let logger = StructuredLogger::new(config.node_name.as_str());
    logger.log_startup(RUNNER_VERSION, pipeline.len());

    let app_state = Arc::new(api::AppState::new(registry, Arc::new(pipeline)));
    app_state.set_ready(true);

    let api_handle = tokio::spawn(api::serve(config.port, app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
                Ok(Ok(())) => {}
            }
            logger.log_shutdown("API server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
