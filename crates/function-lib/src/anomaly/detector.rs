//! Regression-based anomaly detection
//!
//! Predicts each target with a regression estimator, then raises an alert
//! wherever the absolute difference between actual and predicted values is
//! above a threshold.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::HighValueAlert;
use crate::batch::Batch;
use crate::error::{FunctionError, Result};
use crate::estimator::{
    estimator_ui, EstimatorBindings, EstimatorConfig, EstimatorEngine, EvalMetric, Trainable,
};
use crate::function::{ensure_paired, PipelineFunction, Registration};
use crate::registry::CatalogFunction;
use crate::ui::{DataType, DescribeUi, UiDescriptor, UiSchema};

/// Scratch column holding `|target - prediction|` while an alert is evaluated.
/// Input batches must not carry a column with this name.
pub const DIFF_COLUMN: &str = "_diff_";

/// Suffix used to name alerts when none are supplied
pub const DEFAULT_ALERT_SUFFIX: &str = "_alert";

/// Default alert column name for a target
pub fn default_alert_name(target: &str) -> String {
    format!("{}{}", target, DEFAULT_ALERT_SUFFIX)
}

/// Which targets get their alert applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMode {
    /// Every target's alert column is written
    #[default]
    PerTarget,
    /// Only the last target's alert is written; the others are dropped.
    /// Kept for pipelines that depend on the historical behaviour.
    LastTargetOnly,
}

/// Alerts when actual values drift from the model's predictions
pub struct SimpleAnomaly {
    bindings: EstimatorBindings,
    alerts: Vec<String>,
    threshold: f64,
    alert_mode: AlertMode,
    config: EstimatorConfig,
    engine: Arc<dyn EstimatorEngine>,
}

impl SimpleAnomaly {
    pub fn new(
        features: Vec<String>,
        targets: Vec<String>,
        threshold: f64,
        predictions: Option<Vec<String>>,
        alerts: Option<Vec<String>>,
        engine: Arc<dyn EstimatorEngine>,
    ) -> Result<Self> {
        let bindings = EstimatorBindings::resolve(features, targets, predictions)?;
        let alerts = match alerts {
            Some(a) => {
                ensure_paired("alerts", &a, bindings.targets.len())?;
                a
            }
            None => bindings.targets.iter().map(|t| default_alert_name(t)).collect(),
        };

        Ok(Self {
            bindings,
            alerts,
            threshold,
            alert_mode: AlertMode::default(),
            config: EstimatorConfig::default(),
            engine,
        })
    }

    pub fn with_alert_mode(mut self, alert_mode: AlertMode) -> Self {
        self.alert_mode = alert_mode;
        self
    }

    pub fn with_config(mut self, config: EstimatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn alert_mode(&self) -> AlertMode {
        self.alert_mode
    }
}

impl Trainable for SimpleAnomaly {
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

impl PipelineFunction for SimpleAnomaly {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn registration(&self) -> Registration {
        Registration::new(&["features", "target"], &["predictions", "alerts"])
            .with_constants(&["threshold"])
    }

    fn produces(&self) -> Vec<String> {
        let mut out = self.bindings.predictions.clone();
        out.extend(self.alert_columns());
        out
    }

    fn alert_columns(&self) -> Vec<String> {
        match self.alert_mode {
            AlertMode::PerTarget => self.alerts.clone(),
            AlertMode::LastTargetOnly => self.alerts.last().cloned().into_iter().collect(),
        }
    }

    fn execute(&self, batch: Batch) -> Result<Batch> {
        if batch.contains(DIFF_COLUMN) {
            return Err(FunctionError::ReservedColumn(DIFF_COLUMN.to_string()));
        }
        let mut batch = self.engine.execute(&self.spec(), batch)?;
        let last = self.bindings.targets.len().saturating_sub(1);

        for (i, (target, prediction)) in self.bindings.pairs().enumerate() {
            let actual = batch.column(target)?.to_floats();
            let predicted = batch.column(prediction)?.to_floats();
            let diff = actual
                .iter()
                .zip(predicted.iter())
                .map(|(a, p)| (a - p).abs())
                .collect();
            batch.set_floats(DIFF_COLUMN, diff)?;

            let alert = HighValueAlert::new(DIFF_COLUMN, self.threshold, self.alerts[i].as_str());
            match self.alert_mode {
                AlertMode::LastTargetOnly if i != last => {
                    warn!(
                        target_column = %target,
                        alert = %alert.alert_name,
                        "Alert dropped: only the last target is alerted in this mode"
                    );
                }
                _ => batch = alert.execute(batch)?,
            }
        }

        batch.remove_column(DIFF_COLUMN);
        Ok(batch)
    }
}

impl DescribeUi for SimpleAnomaly {
    fn build_ui() -> UiSchema {
        let mut ui = estimator_ui();
        ui.inputs
            .push(UiDescriptor::single("threshold", DataType::Float));
        ui.outputs.push(
            UiDescriptor::function_out_multi("alerts", DataType::Bool, "targets")
                .with_description("Alert outputs"),
        );
        ui
    }
}
