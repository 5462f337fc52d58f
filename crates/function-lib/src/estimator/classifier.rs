//! Classification sample functions

use std::sync::Arc;

use super::{
    estimator_ui, EstimatorBindings, EstimatorConfig, EstimatorEngine, EvalMetric,
    TrainingExpression, Trainable,
};
use crate::batch::Batch;
use crate::error::Result;
use crate::function::{PipelineFunction, Registration};
use crate::registry::CatalogFunction;
use crate::ui::{DescribeUi, UiSchema};

/// Predicts discrete targets, scored by accuracy
pub struct SimpleClassifier {
    bindings: EstimatorBindings,
    config: EstimatorConfig,
    engine: Arc<dyn EstimatorEngine>,
}

impl SimpleClassifier {
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

impl Trainable for SimpleClassifier {
    fn bindings(&self) -> &EstimatorBindings {
        &self.bindings
    }

    fn metric(&self) -> EvalMetric {
        EvalMetric::Accuracy
    }

    fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}

impl PipelineFunction for SimpleClassifier {
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

impl DescribeUi for SimpleClassifier {
    fn build_ui() -> UiSchema {
        estimator_ui()
    }
}

/// Predicts boolean targets, scored by F1.
///
/// Each target is cast to boolean by the engine before fitting.
pub struct SimpleBinaryClassifier {
    bindings: EstimatorBindings,
    config: EstimatorConfig,
    training_expressions: Vec<TrainingExpression>,
    engine: Arc<dyn EstimatorEngine>,
}

impl SimpleBinaryClassifier {
    pub fn new(
        features: Vec<String>,
        targets: Vec<String>,
        predictions: Option<Vec<String>>,
        engine: Arc<dyn EstimatorEngine>,
    ) -> Result<Self> {
        let bindings = EstimatorBindings::resolve(features, targets, predictions)?;
        let training_expressions = bindings
            .targets
            .iter()
            .map(|t| TrainingExpression::cast_to_bool(t.as_str()))
            .collect();

        Ok(Self {
            bindings,
            config: EstimatorConfig::default(),
            training_expressions,
            engine,
        })
    }

    pub fn with_config(mut self, config: EstimatorConfig) -> Self {
        self.config = config;
        self
    }
}

impl Trainable for SimpleBinaryClassifier {
    fn bindings(&self) -> &EstimatorBindings {
        &self.bindings
    }

    fn metric(&self) -> EvalMetric {
        EvalMetric::F1
    }

    fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn training_expressions(&self) -> &[TrainingExpression] {
        &self.training_expressions
    }
}

impl PipelineFunction for SimpleBinaryClassifier {
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

impl DescribeUi for SimpleBinaryClassifier {
    fn build_ui() -> UiSchema {
        estimator_ui()
    }
}
