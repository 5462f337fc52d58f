//! Sample functions for IoT data pipelines
//!
//! This crate provides:
//! - Column-oriented batches keyed by entity and timestamp
//! - Estimator functions (regression, classification, binary classification)
//! - Residual-based anomaly detection and threshold alerts
//! - Scheduled transforms such as scaling by a constant factor
//! - UI schema descriptors and a function catalog
//! - Pipeline execution with metrics and structured logging

pub mod anomaly;
pub mod batch;
pub mod error;
pub mod estimator;
pub mod function;
pub mod observability;
pub mod pipeline;
pub mod registry;
pub mod transform;
pub mod ui;

pub use anomaly::{AlertMode, HighValueAlert, SimpleAnomaly};
pub use batch::{Batch, Column, NamedColumn, RowKey};
pub use error::{FunctionError, Result};
pub use estimator::{
    BaselineEngine, EstimatorConfig, EstimatorEngine, EstimatorSpec, EvalMetric,
    SimpleBinaryClassifier, SimpleClassifier, SimpleRegressor,
};
pub use function::{PipelineFunction, Registration, ScheduledTransform};
pub use observability::{FunctionMetrics, StructuredLogger};
pub use pipeline::{Pipeline, PipelineConfig, StageInfo};
pub use registry::{CatalogEntry, CatalogFunction, FunctionArgs, FunctionRegistry, FunctionSpec};
pub use transform::MultiplyByFactor;
pub use ui::{DataType, DescribeUi, DescriptorKind, UiDescriptor, UiSchema};
