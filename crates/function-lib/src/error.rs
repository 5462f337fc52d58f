//! Error types shared by every pipeline function

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, FunctionError>;

/// Errors raised while building or executing a pipeline function.
///
/// Functions never swallow these; they propagate to whatever engine is
/// driving the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// A bound column is not present in the batch
    #[error("Column '{0}' not found in batch")]
    MissingColumn(String),

    /// A column exists but holds the wrong kind of values
    #[error("Column '{name}' is not {expected}")]
    ColumnType { name: String, expected: &'static str },

    /// A column being written does not match the batch row count
    #[error("Column '{column}' has {actual} values, batch has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two positionally paired bindings have different lengths
    #[error("Binding '{binding}' has {actual} items, expected {expected}")]
    BindingMismatch {
        binding: String,
        expected: usize,
        actual: usize,
    },

    /// A scalar constant could not be converted
    #[error("Constant '{name}' is not numeric: {value}")]
    InvalidConstant { name: String, value: String },

    /// A constructor argument is missing or has the wrong shape
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// No function is registered under this name
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    /// The batch carries a column name the function uses internally
    #[error("Column '{0}' is reserved")]
    ReservedColumn(String),

    /// The estimator engine failed
    #[error("Estimator failed: {0}")]
    Estimator(String),
}
