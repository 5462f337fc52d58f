//! Estimator functions and the seam to the training engine
//!
//! Training, model search and scoring belong to an [`EstimatorEngine`].
//! Functions here only declare bindings, the evaluation metric and any
//! training-time preprocessing, then hand the batch to the engine.

mod bindings;
mod classifier;
mod engine;
mod metric;
mod regressor;

pub use bindings::{
    default_prediction_name, EstimatorBindings, Preprocess, TrainingExpression,
    DEFAULT_PREDICTION_PREFIX,
};
pub use classifier::{SimpleBinaryClassifier, SimpleClassifier};
pub use engine::BaselineEngine;
pub use metric::EvalMetric;
pub use regressor::SimpleRegressor;

use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::error::Result;
use crate::ui::{DataType, UiDescriptor, UiSchema};

/// Default number of candidate estimators trained per execution
pub const DEFAULT_ESTIMATORS_PER_EXECUTION: usize = 3;

/// Default number of search rounds per candidate estimator
pub const DEFAULT_ROUNDS_PER_ESTIMATOR: usize = 3;

/// Training behaviour handed to the engine, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Train a model on first execution when none is stored
    pub train_if_no_model: bool,
    pub estimators_per_execution: usize,
    pub num_rounds_per_estimator: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            train_if_no_model: true,
            estimators_per_execution: DEFAULT_ESTIMATORS_PER_EXECUTION,
            num_rounds_per_estimator: DEFAULT_ROUNDS_PER_ESTIMATOR,
        }
    }
}

/// Everything the engine needs to train and score one estimator function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatorSpec {
    pub bindings: EstimatorBindings,
    pub metric: EvalMetric,
    pub training_expressions: Vec<TrainingExpression>,
    pub config: EstimatorConfig,
}

impl EstimatorSpec {
    /// Preprocessing steps registered for one target, in order
    pub fn expressions_for<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a TrainingExpression> {
        self.training_expressions
            .iter()
            .filter(move |e| e.column == column)
    }
}

/// External estimator engine: trains when needed and appends one prediction
/// column per target.
pub trait EstimatorEngine: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, spec: &EstimatorSpec, batch: Batch) -> Result<Batch>;
}

/// Functions backed by a trained estimator
pub trait Trainable {
    fn bindings(&self) -> &EstimatorBindings;

    fn metric(&self) -> EvalMetric;

    fn config(&self) -> &EstimatorConfig;

    fn training_expressions(&self) -> &[TrainingExpression] {
        &[]
    }

    fn spec(&self) -> EstimatorSpec {
        EstimatorSpec {
            bindings: self.bindings().clone(),
            metric: self.metric(),
            training_expressions: self.training_expressions().to_vec(),
            config: *self.config(),
        }
    }
}

/// UI shared by every estimator: features and targets in, predictions out
pub(crate) fn estimator_ui() -> UiSchema {
    UiSchema {
        inputs: vec![
            UiDescriptor::multi_item("features", DataType::Float)
                .with_description("Data items to use as features"),
            UiDescriptor::multi_item("targets", DataType::Float)
                .with_description("Data items to use as targets"),
        ],
        outputs: vec![UiDescriptor::function_out_multi(
            "predictions",
            DataType::Float,
            "targets",
        )
        .with_description("Output predictions")],
    }
}
