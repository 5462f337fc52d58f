//! Threshold alert on a single data item

use tracing::debug;

use crate::batch::Batch;
use crate::error::Result;
use crate::function::{PipelineFunction, Registration};
use crate::registry::CatalogFunction;
use crate::ui::{DataType, DescribeUi, UiDescriptor, UiSchema};

/// Flags rows where `input_item` is strictly above `upper_threshold`.
///
/// The alert is written as a boolean column named `alert_name`. NaN never
/// raises an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct HighValueAlert {
    pub input_item: String,
    pub upper_threshold: f64,
    pub alert_name: String,
}

impl HighValueAlert {
    pub fn new(
        input_item: impl Into<String>,
        upper_threshold: f64,
        alert_name: impl Into<String>,
    ) -> Self {
        Self {
            input_item: input_item.into(),
            upper_threshold,
            alert_name: alert_name.into(),
        }
    }

    pub fn evaluate(&self, values: &[f64]) -> Vec<bool> {
        values.iter().map(|v| *v > self.upper_threshold).collect()
    }
}

impl PipelineFunction for HighValueAlert {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn registration(&self) -> Registration {
        Registration::new(&["input_item"], &["alert_name"]).with_constants(&["upper_threshold"])
    }

    fn produces(&self) -> Vec<String> {
        vec![self.alert_name.clone()]
    }

    fn alert_columns(&self) -> Vec<String> {
        self.produces()
    }

    fn execute(&self, mut batch: Batch) -> Result<Batch> {
        let flags = self.evaluate(&batch.column(&self.input_item)?.to_floats());
        let raised = flags.iter().filter(|f| **f).count();
        debug!(
            input_item = %self.input_item,
            alert = %self.alert_name,
            upper_threshold = self.upper_threshold,
            raised = raised,
            "High value alert evaluated"
        );

        batch.set_bools(self.alert_name.clone(), flags)?;
        Ok(batch)
    }
}

impl DescribeUi for HighValueAlert {
    fn build_ui() -> UiSchema {
        UiSchema {
            inputs: vec![
                UiDescriptor::multi_item("input_item", DataType::Float)
                    .with_description("Data item to monitor"),
                UiDescriptor::single("upper_threshold", DataType::Float)
                    .with_description("Alert when the value is above this threshold"),
            ],
            outputs: vec![UiDescriptor::single("alert_name", DataType::Bool)
                .with_description("Alert output")],
        }
    }
}
