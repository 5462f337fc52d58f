//! Capability traits implemented by pipeline functions

use serde::{Deserialize, Serialize};

use crate::batch::{Batch, Column};
use crate::error::{FunctionError, Result};

/// Which constructor arguments are column inputs, column outputs and scalars.
///
/// The pipeline engine reads this to tell data-item bindings apart from
/// constants when it wires a function into a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,
}

impl Registration {
    pub fn new(inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            constants: Vec::new(),
        }
    }

    pub fn with_constants(mut self, constants: &[&str]) -> Self {
        self.constants = constants.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// A function the pipeline engine can call once per batch
pub trait PipelineFunction: Send + Sync {
    /// Catalog name of the function
    fn name(&self) -> &'static str;

    /// Argument roles for the pipeline engine
    fn registration(&self) -> Registration;

    /// Columns written by `execute`
    fn produces(&self) -> Vec<String>;

    /// Produced columns that hold alert flags rather than predictions
    fn alert_columns(&self) -> Vec<String> {
        Vec::new()
    }

    /// Process one batch and return it augmented
    fn execute(&self, batch: Batch) -> Result<Batch>;
}

/// Stateless per-row column mapping.
///
/// Implementors describe which input feeds which output and how a single
/// value is mapped; `apply` does the rest.
pub trait ScheduledTransform: PipelineFunction {
    /// `(input, output)` column pairs, in binding order
    fn column_pairs(&self) -> Vec<(&str, &str)>;

    fn map_value(&self, value: f64) -> f64;

    fn apply(&self, mut batch: Batch) -> Result<Batch> {
        for (input, output) in self.column_pairs() {
            let mapped = batch
                .column(input)?
                .to_floats()
                .into_iter()
                .map(|v| self.map_value(v))
                .collect();
            batch.set_column(output, Column::Float(mapped))?;
        }
        Ok(batch)
    }
}

/// Check that a binding positionally paired with another has the same length
pub(crate) fn ensure_paired(binding: &str, items: &[String], expected: usize) -> Result<()> {
    if items.len() != expected {
        return Err(FunctionError::BindingMismatch {
            binding: binding.to_string(),
            expected,
            actual: items.len(),
        });
    }
    Ok(())
}
