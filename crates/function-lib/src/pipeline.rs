//! Sequential execution of configured functions
//!
//! A pipeline threads one batch through its stages in order and stops at the
//! first error. Each stage's latency, row count and raised alerts are
//! recorded.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::batch::{Batch, Column};
use crate::error::Result;
use crate::estimator::EstimatorEngine;
use crate::function::{PipelineFunction, Registration};
use crate::observability::{FunctionMetrics, StructuredLogger};
use crate::registry::{FunctionRegistry, FunctionSpec};

/// Stage list as stored in a pipeline definition file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<FunctionSpec>,
}

/// Description of one loaded stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageInfo {
    pub function: &'static str,
    pub registration: Registration,
    pub produces: Vec<String>,
    pub alerts: Vec<String>,
}

pub struct Pipeline {
    stages: Vec<Box<dyn PipelineFunction>>,
    metrics: FunctionMetrics,
    logger: StructuredLogger,
}

impl Pipeline {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            stages: Vec::new(),
            metrics: FunctionMetrics::new(),
            logger: StructuredLogger::new(instance),
        }
    }

    /// Build every stage of `config`, sharing one estimator engine
    pub fn from_config(
        instance: impl Into<String>,
        registry: &FunctionRegistry,
        config: &PipelineConfig,
        engine: Arc<dyn EstimatorEngine>,
    ) -> Result<Self> {
        let mut pipeline = Self::new(instance);
        for spec in &config.stages {
            pipeline.push(registry.build(spec, engine.clone())?);
        }
        Ok(pipeline)
    }

    pub fn push(&mut self, stage: Box<dyn PipelineFunction>) {
        self.stages.push(stage);
        self.metrics.set_pipeline_stages(self.stages.len());
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn describe(&self) -> Vec<StageInfo> {
        self.stages
            .iter()
            .map(|s| StageInfo {
                function: s.name(),
                registration: s.registration(),
                produces: s.produces(),
                alerts: s.alert_columns(),
            })
            .collect()
    }

    pub fn execute(&self, mut batch: Batch) -> Result<Batch> {
        for stage in &self.stages {
            let name = stage.name();
            let start = Instant::now();

            batch = match stage.execute(batch) {
                Ok(b) => b,
                Err(e) => {
                    self.metrics.inc_execution_errors(name);
                    self.logger.log_stage_failure(name, &e.to_string());
                    return Err(e);
                }
            };

            let elapsed = start.elapsed();
            let produced = stage.produces();
            self.metrics
                .observe_execution(name, elapsed.as_secs_f64(), batch.len());
            self.logger
                .log_stage(name, batch.len(), elapsed.as_micros(), &produced);
            self.record_alerts(name, &batch, &stage.alert_columns());
        }
        Ok(batch)
    }

    /// Count raised flags in the alert columns a stage declares
    fn record_alerts(&self, function: &str, batch: &Batch, alerts: &[String]) {
        for column in alerts {
            if let Ok(Column::Bool(flags)) = batch.column(column) {
                let raised = flags.iter().filter(|f| **f).count();
                if raised > 0 {
                    self.metrics.inc_alerts_raised(function, column, raised);
                    self.logger.log_alerts(function, column, raised, batch.len());
                }
            }
        }
    }
}
