//! Pipeline validation and local execution commands

use anyhow::{Context, Result};
use colored::Colorize;
use function_lib::{
    BaselineEngine, Batch, Column, FunctionRegistry, Pipeline, PipelineConfig, StageInfo,
};
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;
use tracing::debug;

use crate::output::{batch_table, print_info, print_json, print_success, print_table, print_warning, OutputFormat};

/// Row for the stage table
#[derive(Tabled)]
struct StageRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Function")]
    function: String,
    #[tabled(rename = "Constants")]
    constants: String,
    #[tabled(rename = "Produces")]
    produces: String,
}

impl StageRow {
    fn new(position: usize, stage: &StageInfo) -> Self {
        Self {
            position,
            function: stage.function.to_string(),
            constants: stage.registration.constants.join(", "),
            produces: stage.produces.join(", "),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file {}", what, path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid {} in {}", what, path.display()))
}

/// Build a pipeline from a definition file
pub fn load_pipeline(registry: &FunctionRegistry, path: &Path) -> Result<Pipeline> {
    let config: PipelineConfig = read_json(path, "pipeline")?;
    Pipeline::from_config("fnctl", registry, &config, Arc::new(BaselineEngine))
        .with_context(|| format!("Failed to build pipeline from {}", path.display()))
}

/// Rows flagged per alert column the pipeline declares
pub fn alert_counts(batch: &Batch, stages: &[StageInfo]) -> Vec<(String, usize)> {
    stages
        .iter()
        .flat_map(|s| s.alerts.iter())
        .filter_map(|name| match batch.column(name) {
            Ok(Column::Bool(flags)) => Some((name.clone(), flags.iter().filter(|f| **f).count())),
            _ => None,
        })
        .collect()
}

/// Check that a pipeline definition builds
pub fn validate(registry: &FunctionRegistry, path: &Path, format: OutputFormat) -> Result<()> {
    let pipeline = load_pipeline(registry, path)?;
    let stages = pipeline.describe();

    match format {
        OutputFormat::Json => print_json(&stages)?,
        OutputFormat::Table => {
            let rows: Vec<StageRow> = stages
                .iter()
                .enumerate()
                .map(|(i, s)| StageRow::new(i + 1, s))
                .collect();
            print_table(&rows);
            print_success(&format!("Pipeline is valid ({} stages)", stages.len()));
        }
    }

    Ok(())
}

/// Execute a pipeline over a batch file
pub fn run(
    registry: &FunctionRegistry,
    pipeline_path: &Path,
    batch_path: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let pipeline = load_pipeline(registry, pipeline_path)?;
    debug!(pipeline = %pipeline_path.display(), stages = pipeline.len(), "Pipeline loaded");

    let batch: Batch = read_json(batch_path, "batch")?;
    debug!(batch = %batch_path.display(), rows = batch.len(), "Batch loaded");

    let result = pipeline.execute(batch).context("Pipeline execution failed")?;

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(output = %path.display(), "Result written");
    }

    match format {
        OutputFormat::Json => {
            if output.is_none() {
                print_json(&result)?;
            }
        }
        OutputFormat::Table => {
            println!("{}", batch_table(&result));
            for (alert, raised) in alert_counts(&result, &pipeline.describe()) {
                if raised > 0 {
                    print_warning(&format!("{}: {} of {} rows flagged", alert.bold(), raised, result.len()));
                } else {
                    print_info(&format!("{}: no rows flagged", alert));
                }
            }
            if let Some(path) = output {
                print_success(&format!("Wrote {}", path.display()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_pipeline_reports_unknown_function() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.json", r#"{"stages": [{"function": "Nope"}]}"#);

        let err = load_pipeline(&FunctionRegistry::with_builtins(), &path).err().unwrap();
        assert!(format!("{:#}", err).contains("Nope"));
    }

    #[test]
    fn test_alert_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "p.json",
            r#"{"stages": [{"function": "AlertHighValue",
                "args": {"input_item": "p", "upper_threshold": 2, "alert_name": "p_high"}}]}"#,
        );
        let pipeline = load_pipeline(&FunctionRegistry::with_builtins(), &path).unwrap();

        let batch: Batch = serde_json::from_str(
            r#"{"index": [
                    {"entity_id": "a", "timestamp": "2024-01-01T00:00:00Z"},
                    {"entity_id": "a", "timestamp": "2024-01-01T00:01:00Z"},
                    {"entity_id": "a", "timestamp": "2024-01-01T00:02:00Z"}],
                "columns": [{"name": "p", "values": {"float": [1.0, 3.0, 5.0]}}]}"#,
        )
        .unwrap();
        let out = pipeline.execute(batch).unwrap();

        assert_eq!(
            alert_counts(&out, &pipeline.describe()),
            vec![("p_high".to_string(), 2)]
        );
    }

    #[test]
    fn test_alert_counts_skip_boolean_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "p.json",
            r#"{"stages": [{"function": "SimpleBinaryClassifier",
                "args": {"features": ["speed"], "targets": ["failure"]}}]}"#,
        );
        let pipeline = load_pipeline(&FunctionRegistry::with_builtins(), &path).unwrap();

        let batch: Batch = serde_json::from_str(
            r#"{"index": [
                    {"entity_id": "a", "timestamp": "2024-01-01T00:00:00Z"},
                    {"entity_id": "a", "timestamp": "2024-01-01T00:01:00Z"}],
                "columns": [
                    {"name": "speed", "values": {"float": [1.0, 2.0]}},
                    {"name": "failure", "values": {"float": [1.0, 1.0]}}]}"#,
        )
        .unwrap();
        let out = pipeline.execute(batch).unwrap();

        assert!(out.contains("predicted_failure"));
        assert!(alert_counts(&out, &pipeline.describe()).is_empty());
    }
}
