//! Scale input items by a constant factor

use crate::batch::Batch;
use crate::error::{FunctionError, Result};
use crate::function::{PipelineFunction, Registration, ScheduledTransform};
use crate::registry::CatalogFunction;
use crate::ui::{DataType, DescribeUi, UiDescriptor, UiSchema};

/// Writes `output_items[i] = input_items[i] * factor` for every input
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplyByFactor {
    input_items: Vec<String>,
    factor: f64,
    output_items: Vec<String>,
}

impl MultiplyByFactor {
    /// Extra output names beyond the inputs are ignored; fewer is an error.
    pub fn new(input_items: Vec<String>, factor: f64, output_items: Vec<String>) -> Result<Self> {
        if output_items.len() < input_items.len() {
            return Err(FunctionError::BindingMismatch {
                binding: "output_items".to_string(),
                expected: input_items.len(),
                actual: output_items.len(),
            });
        }

        Ok(Self {
            input_items,
            factor,
            output_items,
        })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl PipelineFunction for MultiplyByFactor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn registration(&self) -> Registration {
        Registration::new(&["input_items"], &["output_items"]).with_constants(&["factor"])
    }

    fn produces(&self) -> Vec<String> {
        self.output_items[..self.input_items.len()].to_vec()
    }

    fn execute(&self, batch: Batch) -> Result<Batch> {
        self.apply(batch)
    }
}

impl ScheduledTransform for MultiplyByFactor {
    fn column_pairs(&self) -> Vec<(&str, &str)> {
        self.input_items
            .iter()
            .zip(self.output_items.iter())
            .map(|(i, o)| (i.as_str(), o.as_str()))
            .collect()
    }

    fn map_value(&self, value: f64) -> f64 {
        value * self.factor
    }
}

impl DescribeUi for MultiplyByFactor {
    fn build_ui() -> UiSchema {
        UiSchema {
            inputs: vec![
                UiDescriptor::multi_item("input_items", DataType::Float)
                    .with_description("Data items adjust")
                    .with_output_item("output_items"),
                UiDescriptor::single("factor", DataType::Float),
            ],
            outputs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::test_batch;
    use serde_json::json;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scales_by_factor() {
        let mut batch = test_batch(2);
        batch.set_floats("temp", vec![10.0, 20.0]).unwrap();
        batch.set_floats("pressure", vec![1.0, 2.0]).unwrap();

        let f = MultiplyByFactor::new(names(&["temp"]), 2.5, names(&["temp_scaled"])).unwrap();
        let out = f.execute(batch).unwrap();

        assert_eq!(out.floats("temp_scaled").unwrap(), &[25.0, 50.0]);
        assert_eq!(out.floats("temp").unwrap(), &[10.0, 20.0]);
        assert_eq!(out.floats("pressure").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_exact_float_multiplication() {
        let values = vec![0.1, 1e-300, -3.3, f64::MAX / 4.0];
        let factor = 3.7;
        let mut batch = test_batch(values.len());
        batch.set_floats("x", values.clone()).unwrap();

        let f = MultiplyByFactor::new(names(&["x"]), factor, names(&["y"])).unwrap();
        let out = f.execute(batch).unwrap();

        let expected: Vec<f64> = values.iter().map(|v| v * factor).collect();
        assert_eq!(out.floats("y").unwrap(), expected.as_slice());
    }

    #[test]
    fn test_multiple_items_positionally_paired() {
        let mut batch = test_batch(1);
        batch.set_floats("a", vec![1.0]).unwrap();
        batch.set_floats("b", vec![2.0]).unwrap();

        let f = MultiplyByFactor::new(names(&["a", "b"]), 10.0, names(&["a10", "b10"])).unwrap();
        let out = f.execute(batch).unwrap();

        assert_eq!(out.floats("a10").unwrap(), &[10.0]);
        assert_eq!(out.floats("b10").unwrap(), &[20.0]);
    }

    #[test]
    fn test_too_few_outputs() {
        let result = MultiplyByFactor::new(names(&["a", "b"]), 1.0, names(&["a1"]));
        assert!(matches!(
            result,
            Err(FunctionError::BindingMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_extra_outputs_ignored() {
        let f = MultiplyByFactor::new(names(&["a"]), 1.0, names(&["a1", "unused"])).unwrap();
        assert_eq!(f.produces(), names(&["a1"]));
    }

    #[test]
    fn test_missing_input_column() {
        let f = MultiplyByFactor::new(names(&["temp"]), 2.0, names(&["temp2"])).unwrap();
        let result = f.execute(test_batch(1));
        assert_eq!(
            result.unwrap_err(),
            FunctionError::MissingColumn("temp".to_string())
        );
    }

    #[test]
    fn test_ui_output_cardinality_tracks_inputs() {
        let ui = MultiplyByFactor::build_ui();
        assert!(ui.outputs.is_empty());

        let args = json!({"input_items": ["a", "b", "c"], "factor": 2.0});
        assert_eq!(
            ui.output_cardinality("output_items", args.as_object().unwrap()),
            Some(3)
        );
    }
}
