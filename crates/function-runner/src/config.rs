//! Runner configuration

use anyhow::{Context, Result};
use function_lib::PipelineConfig;
use serde::Deserialize;
use std::path::Path;

/// Runner configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Instance name reported in logs
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pipeline definition (JSON). Without one the runner serves an empty pipeline.
    #[serde(default)]
    pub pipeline_path: Option<String>,
}

fn default_node_name() -> String {
    std::env::var("NODE_NAME").unwrap_or_else(|_| "local".to_string())
}

fn default_port() -> u16 {
    8080
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            port: default_port(),
            pipeline_path: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from an optional `runner` file and `RUNNER_*` env vars
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("runner").required(false))
            .add_source(config::Environment::with_prefix("RUNNER"))
            .build()?;

        config
            .try_deserialize()
            .context("Invalid runner configuration")
    }

    pub fn pipeline(&self) -> Result<PipelineConfig> {
        match &self.pipeline_path {
            Some(path) => load_pipeline(path),
            None => Ok(PipelineConfig::default()),
        }
    }
}

/// Read a pipeline definition file
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid pipeline definition in {}", path.display()))
}
