//! Anomaly detection on model residuals
//!
//! This module provides:
//! - A high value alert over a single data item
//! - A regression-backed detector that alerts on large residuals

mod alert;
mod detector;

pub use alert::HighValueAlert;
pub use detector::{default_alert_name, AlertMode, SimpleAnomaly, DEFAULT_ALERT_SUFFIX, DIFF_COLUMN};
