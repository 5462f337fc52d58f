//! Evaluation metrics selected by estimator functions

use serde::{Deserialize, Serialize};

/// Metric the engine uses to score candidate estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalMetric {
    /// Coefficient of determination
    R2,
    Accuracy,
    /// F1 of the positive class
    F1,
}

impl EvalMetric {
    /// Whether predictions are class labels rather than continuous values
    pub fn is_classification(&self) -> bool {
        matches!(self, EvalMetric::Accuracy | EvalMetric::F1)
    }

    /// Score predictions against actual values. Returns NaN for empty input.
    pub fn score(&self, actual: &[f64], predicted: &[f64]) -> f64 {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return f64::NAN;
        }
        let (actual, predicted) = (&actual[..n], &predicted[..n]);

        match self {
            EvalMetric::R2 => r2(actual, predicted),
            EvalMetric::Accuracy => {
                let hits = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
                hits as f64 / n as f64
            }
            EvalMetric::F1 => f1(actual, predicted),
        }
    }
}

fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot < f64::EPSILON {
        return if ss_res < f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn f1(actual: &[f64], predicted: &[f64]) -> f64 {
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (a, p) in actual.iter().zip(predicted) {
        match (*a != 0.0, *p != 0.0) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        return 0.0;
    }
    2.0 * tp as f64 / denom as f64
}
