//! Baseline estimator engine used when no external engine is attached
//!
//! Predicts each target from the batch itself: the mean for regression and
//! the most frequent value for classification. Targets pass through their
//! registered training expressions first.

use tracing::debug;

use super::{EstimatorEngine, EstimatorSpec};
use crate::batch::{Batch, Column};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineEngine;

impl BaselineEngine {
    pub fn new() -> Self {
        Self
    }

    fn prepared_target(spec: &EstimatorSpec, batch: &Batch, target: &str) -> Result<Column> {
        let mut column = batch.column(target)?.clone();
        for expr in spec.expressions_for(target) {
            column = expr.step.apply(&column);
        }
        Ok(column)
    }

    fn predict(spec: &EstimatorSpec, target: &Column) -> Column {
        let n = target.len();
        if n == 0 {
            return match target {
                Column::Bool(_) => Column::Bool(Vec::new()),
                Column::Float(_) => Column::Float(Vec::new()),
            };
        }

        match target {
            Column::Bool(values) => {
                let positives = values.iter().filter(|v| **v).count();
                Column::Bool(vec![positives * 2 > n; n])
            }
            Column::Float(values) if spec.metric.is_classification() => {
                Column::Float(vec![most_frequent(values); n])
            }
            Column::Float(values) => {
                let mean = values.iter().sum::<f64>() / n as f64;
                Column::Float(vec![mean; n])
            }
        }
    }
}

impl EstimatorEngine for BaselineEngine {
    fn name(&self) -> &str {
        "baseline"
    }

    fn execute(&self, spec: &EstimatorSpec, mut batch: Batch) -> Result<Batch> {
        for feature in &spec.bindings.features {
            batch.column(feature)?;
        }

        for (target, prediction) in spec.bindings.pairs() {
            let actual = Self::prepared_target(spec, &batch, target)?;
            let predicted = Self::predict(spec, &actual);

            let score = spec
                .metric
                .score(&actual.to_floats(), &predicted.to_floats());
            debug!(
                target_column = %target,
                prediction = %prediction,
                metric = ?spec.metric,
                score = score,
                "Baseline prediction written"
            );

            batch.set_column(prediction, predicted)?;
        }

        Ok(batch)
    }
}

/// Most frequent value; ties go to the value seen first
fn most_frequent(values: &[f64]) -> f64 {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for v in values {
        match counts.iter_mut().find(|(seen, _)| seen.to_bits() == v.to_bits()) {
            Some((_, count)) => *count += 1,
            None => counts.push((*v, 1)),
        }
    }

    let mut best = (f64::NAN, 0);
    for (value, count) in counts {
        if count > best.1 {
            best = (value, count);
        }
    }
    best.0
}
