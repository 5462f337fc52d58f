//! Feature / target / prediction bindings and training-time preprocessing

use serde::{Deserialize, Serialize};

use crate::batch::Column;
use crate::error::{FunctionError, Result};
use crate::function::ensure_paired;

/// Prefix used to name predictions when none are supplied
pub const DEFAULT_PREDICTION_PREFIX: &str = "predicted_";

/// Default prediction column name for a target
pub fn default_prediction_name(target: &str) -> String {
    format!("{}{}", DEFAULT_PREDICTION_PREFIX, target)
}

/// Resolved column bindings of an estimator function.
///
/// `predictions[i]` is the model output for `targets[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorBindings {
    pub features: Vec<String>,
    pub targets: Vec<String>,
    pub predictions: Vec<String>,
}

impl EstimatorBindings {
    /// Resolve bindings, deriving prediction names when omitted
    pub fn resolve(
        features: Vec<String>,
        targets: Vec<String>,
        predictions: Option<Vec<String>>,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(FunctionError::InvalidArgument {
                name: "features".to_string(),
                reason: "at least one feature is required".to_string(),
            });
        }
        if targets.is_empty() {
            return Err(FunctionError::InvalidArgument {
                name: "targets".to_string(),
                reason: "at least one target is required".to_string(),
            });
        }

        let predictions = match predictions {
            Some(p) => {
                ensure_paired("predictions", &p, targets.len())?;
                p
            }
            None => targets.iter().map(|t| default_prediction_name(t)).collect(),
        };

        Ok(Self {
            features,
            targets,
            predictions,
        })
    }

    /// `(target, prediction)` pairs in binding order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets
            .iter()
            .zip(self.predictions.iter())
            .map(|(t, p)| (t.as_str(), p.as_str()))
    }
}

/// Typed preprocessing step applied to a target before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preprocess {
    CastToBool,
    Identity,
}

impl Preprocess {
    pub fn apply(&self, column: &Column) -> Column {
        match self {
            Preprocess::CastToBool => Column::Bool(column.to_bools()),
            Preprocess::Identity => column.clone(),
        }
    }
}

/// A preprocessing step bound to one target column.
///
/// Interpreted by the estimator engine at training time; constructing one
/// never touches a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExpression {
    pub column: String,
    pub step: Preprocess,
}

impl TrainingExpression {
    pub fn cast_to_bool(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            step: Preprocess::CastToBool,
        }
    }
}
