//! Regression sample function

use std::sync::Arc;

use super::{estimator_ui, EstimatorBindings, EstimatorConfig, EstimatorEngine, EvalMetric, Trainable};
use crate::batch::Batch;
use crate::error::Result;
use crate::function::{PipelineFunction, Registration};
use crate::registry::CatalogFunction;
use crate::ui::{DescribeUi, UiSchema};

/// Predicts continuous targets from the selected features
pub struct SimpleRegressor {
    bindings: EstimatorBindings,
    config: EstimatorConfig,
    engine: Arc<dyn EstimatorEngine>,
}

impl SimpleRegressor {
    pub fn new(
        features: Vec<String>,
        targets: Vec<String>,
        predictions: Option<Vec<String>>,
        engine: Arc<dyn EstimatorEngine>,
    ) -> Result<Self> {
        Ok(Self {
            bindings: EstimatorBindings::resolve(features, targets, predictions)?,
            config: EstimatorConfig::default(),
            engine,
        })
    }

    pub fn with_config(mut self, config: EstimatorConfig) -> Self {
        self.config = config;
        self
    }
}

impl Trainable for SimpleRegressor {
    fn bindings(&self) -> &EstimatorBindings {
        &self.bindings
    }

    fn metric(&self) -> EvalMetric {
        EvalMetric::R2
    }

    fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}

impl PipelineFunction for SimpleRegressor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn registration(&self) -> Registration {
        Registration::new(&["features", "target"], &["predictions"])
    }

    fn produces(&self) -> Vec<String> {
        self.bindings.predictions.clone()
    }

    fn execute(&self, batch: Batch) -> Result<Batch> {
        self.engine.execute(&self.spec(), batch)
    }
}

impl DescribeUi for SimpleRegressor {
    fn build_ui() -> UiSchema {
        estimator_ui()
    }
}
