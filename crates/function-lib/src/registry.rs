//! Function catalog
//!
//! Maps catalog names to constructors so a pipeline engine can instantiate
//! functions from a JSON argument map, and lists each function's UI schema.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::anomaly::{AlertMode, HighValueAlert, SimpleAnomaly};
use crate::error::{FunctionError, Result};
use crate::estimator::{
    EstimatorConfig, EstimatorEngine, SimpleBinaryClassifier, SimpleClassifier, SimpleRegressor,
};
use crate::function::PipelineFunction;
use crate::transform::MultiplyByFactor;
use crate::ui::{DescribeUi, UiSchema};

/// Keyword arguments bound by the pipeline engine
pub type FunctionArgs = Map<String, Value>;

/// One configured pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub function: String,
    #[serde(default)]
    pub args: FunctionArgs,
}

/// Functions that can be built from keyword arguments
pub trait CatalogFunction: DescribeUi + Sized {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn from_args(args: &FunctionArgs, engine: Arc<dyn EstimatorEngine>) -> Result<Self>;
}

/// Catalog listing for one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub ui: UiSchema,
}

type Constructor = fn(&FunctionArgs, Arc<dyn EstimatorEngine>) -> Result<Box<dyn PipelineFunction>>;

struct FunctionEntry {
    name: &'static str,
    description: &'static str,
    build_ui: fn() -> UiSchema,
    construct: Constructor,
}

fn construct<T: CatalogFunction + PipelineFunction + 'static>(
    args: &FunctionArgs,
    engine: Arc<dyn EstimatorEngine>,
) -> Result<Box<dyn PipelineFunction>> {
    Ok(Box::new(T::from_args(args, engine)?))
}

/// Registry of constructible functions
#[derive(Default)]
pub struct FunctionRegistry {
    entries: Vec<FunctionEntry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every function shipped with this crate
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<SimpleAnomaly>();
        registry.register::<SimpleRegressor>();
        registry.register::<SimpleClassifier>();
        registry.register::<SimpleBinaryClassifier>();
        registry.register::<MultiplyByFactor>();
        registry.register::<HighValueAlert>();
        registry
    }

    /// Register a function, replacing any entry with the same name
    pub fn register<T: CatalogFunction + PipelineFunction + 'static>(&mut self) {
        self.entries.retain(|e| e.name != T::NAME);
        self.entries.push(FunctionEntry {
            name: T::NAME,
            description: T::DESCRIPTION,
            build_ui: T::build_ui,
            construct: construct::<T>,
        });
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    fn entry(&self, name: &str) -> Result<&FunctionEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))
    }

    pub fn ui(&self, name: &str) -> Result<UiSchema> {
        Ok((self.entry(name)?.build_ui)())
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .map(|e| CatalogEntry {
                name: e.name,
                description: e.description,
                ui: (e.build_ui)(),
            })
            .collect()
    }

    /// Instantiate the function a stage names
    pub fn build(
        &self,
        spec: &FunctionSpec,
        engine: Arc<dyn EstimatorEngine>,
    ) -> Result<Box<dyn PipelineFunction>> {
        (self.entry(&spec.function)?.construct)(&spec.args, engine)
    }
}

fn invalid(name: &str, reason: &str) -> FunctionError {
    FunctionError::InvalidArgument {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn optional_string_list(args: &FunctionArgs, name: &str) -> Result<Option<Vec<String>>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(name, "expected a list of column names"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(_) => Err(invalid(name, "expected a list of column names")),
    }
}

fn string_list(args: &FunctionArgs, name: &str) -> Result<Vec<String>> {
    optional_string_list(args, name)?.ok_or_else(|| invalid(name, "required"))
}

/// One column name, given bare or as a one-item list
fn string(args: &FunctionArgs, name: &str) -> Result<String> {
    match optional_string_list(args, name) {
        Ok(Some(mut items)) if items.len() == 1 => Ok(items.remove(0)),
        _ => Err(invalid(name, "expected a column name")),
    }
}

/// Numeric constant; numeric strings are converted, anything else fails
fn number(args: &FunctionArgs, name: &str) -> Result<f64> {
    let value = args.get(name).ok_or_else(|| invalid(name, "required"))?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FunctionError::InvalidConstant {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn deserialize_optional<T: serde::de::DeserializeOwned>(
    args: &FunctionArgs,
    name: &str,
) -> Result<Option<T>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| invalid(name, &e.to_string())),
    }
}

fn estimator_config(args: &FunctionArgs) -> Result<EstimatorConfig> {
    Ok(deserialize_optional(args, "config")?.unwrap_or_default())
}

impl CatalogFunction for SimpleAnomaly {
    const NAME: &'static str = "SimpleAnomaly";
    const DESCRIPTION: &'static str = "Predicts targets with a regression model and alerts when the \
         difference between actual and predicted values exceeds a threshold";

    fn from_args(args: &FunctionArgs, engine: Arc<dyn EstimatorEngine>) -> Result<Self> {
        let alert_mode: AlertMode = deserialize_optional(args, "alert_mode")?.unwrap_or_default();
        Ok(SimpleAnomaly::new(
            string_list(args, "features")?,
            string_list(args, "targets")?,
            number(args, "threshold")?,
            optional_string_list(args, "predictions")?,
            optional_string_list(args, "alerts")?,
            engine,
        )?
        .with_alert_mode(alert_mode)
        .with_config(estimator_config(args)?))
    }
}

impl CatalogFunction for SimpleRegressor {
    const NAME: &'static str = "SimpleRegressor";
    const DESCRIPTION: &'static str =
        "Predicts the value of a continuous target from the selected features";

    fn from_args(args: &FunctionArgs, engine: Arc<dyn EstimatorEngine>) -> Result<Self> {
        Ok(SimpleRegressor::new(
            string_list(args, "features")?,
            string_list(args, "targets")?,
            optional_string_list(args, "predictions")?,
            engine,
        )?
        .with_config(estimator_config(args)?))
    }
}

impl CatalogFunction for SimpleClassifier {
    const NAME: &'static str = "SimpleClassifier";
    const DESCRIPTION: &'static str =
        "Predicts the value of a discrete target from the selected features";

    fn from_args(args: &FunctionArgs, engine: Arc<dyn EstimatorEngine>) -> Result<Self> {
        Ok(SimpleClassifier::new(
            string_list(args, "features")?,
            string_list(args, "targets")?,
            optional_string_list(args, "predictions")?,
            engine,
        )?
        .with_config(estimator_config(args)?))
    }
}

impl CatalogFunction for SimpleBinaryClassifier {
    const NAME: &'static str = "SimpleBinaryClassifier";
    const DESCRIPTION: &'static str =
        "Predicts a boolean target from the selected features, scored by F1";

    fn from_args(args: &FunctionArgs, engine: Arc<dyn EstimatorEngine>) -> Result<Self> {
        Ok(SimpleBinaryClassifier::new(
            string_list(args, "features")?,
            string_list(args, "targets")?,
            optional_string_list(args, "predictions")?,
            engine,
        )?
        .with_config(estimator_config(args)?))
    }
}

impl CatalogFunction for MultiplyByFactor {
    const NAME: &'static str = "MultiplyByFactor";
    const DESCRIPTION: &'static str = "Scales input items by a constant factor";

    fn from_args(args: &FunctionArgs, _engine: Arc<dyn EstimatorEngine>) -> Result<Self> {
        MultiplyByFactor::new(
            string_list(args, "input_items")?,
            number(args, "factor")?,
            string_list(args, "output_items")?,
        )
    }
}

impl CatalogFunction for HighValueAlert {
    const NAME: &'static str = "AlertHighValue";
    const DESCRIPTION: &'static str = "Raises an alert when a data item is above a threshold";

    fn from_args(args: &FunctionArgs, _engine: Arc<dyn EstimatorEngine>) -> Result<Self> {
        Ok(HighValueAlert::new(
            string(args, "input_item")?,
            number(args, "upper_threshold")?,
            string(args, "alert_name")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::test_batch;
    use crate::estimator::BaselineEngine;
    use crate::ui::{DataType, DescriptorKind};
    use serde_json::json;

    fn spec(value: Value) -> FunctionSpec {
        serde_json::from_value(value).unwrap()
    }

    fn engine() -> Arc<dyn EstimatorEngine> {
        Arc::new(BaselineEngine)
    }

    #[test]
    fn test_builtins_listed() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "SimpleAnomaly",
                "SimpleRegressor",
                "SimpleClassifier",
                "SimpleBinaryClassifier",
                "MultiplyByFactor",
                "AlertHighValue",
            ]
        );
        assert_eq!(registry.catalog().len(), 6);
    }

    #[test]
    fn test_build_and_execute_scale() {
        let registry = FunctionRegistry::with_builtins();
        let f = registry
            .build(
                &spec(json!({
                    "function": "MultiplyByFactor",
                    "args": {"input_items": ["temp"], "factor": "2.5", "output_items": ["temp_scaled"]}
                })),
                engine(),
            )
            .unwrap();

        let mut batch = test_batch(2);
        batch.set_floats("temp", vec![10.0, 20.0]).unwrap();
        let out = f.execute(batch).unwrap();
        assert_eq!(out.floats("temp_scaled").unwrap(), &[25.0, 50.0]);
    }

    #[test]
    fn test_non_numeric_factor_rejected() {
        let registry = FunctionRegistry::with_builtins();
        let result = registry.build(
            &spec(json!({
                "function": "MultiplyByFactor",
                "args": {"input_items": ["temp"], "factor": "abc", "output_items": ["t"]}
            })),
            engine(),
        );
        assert!(matches!(
            result,
            Err(FunctionError::InvalidConstant { name, .. }) if name == "factor"
        ));
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::with_builtins();
        let result = registry.build(&spec(json!({"function": "Nope"})), engine());
        assert!(matches!(result, Err(FunctionError::UnknownFunction(n)) if n == "Nope"));
        assert!(registry.ui("Nope").is_err());
    }

    #[test]
    fn test_anomaly_args_with_mode_and_config() {
        let registry = FunctionRegistry::with_builtins();
        let f = registry
            .build(
                &spec(json!({
                    "function": "SimpleAnomaly",
                    "args": {
                        "features": ["speed"],
                        "targets": ["x", "y"],
                        "threshold": 2,
                        "alert_mode": "last_target_only",
                        "config": {
                            "train_if_no_model": false,
                            "estimators_per_execution": 1,
                            "num_rounds_per_estimator": 1
                        }
                    }
                })),
                engine(),
            )
            .unwrap();

        assert_eq!(f.name(), "SimpleAnomaly");
        assert_eq!(
            f.produces(),
            vec!["predicted_x".to_string(), "predicted_y".to_string(), "y_alert".to_string()]
        );
    }

    #[test]
    fn test_missing_required_argument() {
        let registry = FunctionRegistry::with_builtins();
        let result = registry.build(
            &spec(json!({"function": "SimpleRegressor", "args": {"features": ["speed"]}})),
            engine(),
        );
        assert!(matches!(
            result,
            Err(FunctionError::InvalidArgument { name, .. }) if name == "targets"
        ));
    }

    #[test]
    fn test_single_string_accepted_as_list() {
        let registry = FunctionRegistry::with_builtins();
        let f = registry
            .build(
                &spec(json!({
                    "function": "SimpleBinaryClassifier",
                    "args": {"features": "speed", "targets": "failure"}
                })),
                engine(),
            )
            .unwrap();
        assert_eq!(f.produces(), vec!["predicted_failure".to_string()]);
    }

    #[test]
    fn test_alert_high_value_args() {
        let registry = FunctionRegistry::with_builtins();
        let f = registry
            .build(
                &spec(json!({
                    "function": "AlertHighValue",
                    "args": {"input_item": "pressure", "upper_threshold": 5.0, "alert_name": "high"}
                })),
                engine(),
            )
            .unwrap();
        assert_eq!(f.produces(), vec!["high".to_string()]);
    }

    /// Arguments shaped the way a UI would bind each descriptor
    fn args_from_ui(ui: &UiSchema) -> FunctionArgs {
        let mut args = FunctionArgs::new();
        for d in &ui.inputs {
            let value = match (d.kind, d.datatype) {
                (DescriptorKind::Single, DataType::Float) => json!(2.0),
                (DescriptorKind::Single, DataType::Bool) => json!(true),
                _ => json!([format!("{}_col", d.name)]),
            };
            args.insert(d.name.clone(), value);
            if let Some(output) = &d.output_item {
                args.insert(output.clone(), json!([format!("{}_col", output)]));
            }
        }
        for d in &ui.outputs {
            let value = match d.kind {
                DescriptorKind::Single => json!(format!("{}_col", d.name)),
                _ => json!([format!("{}_col", d.name)]),
            };
            args.insert(d.name.clone(), value);
        }
        args
    }

    #[test]
    fn test_every_function_builds_from_its_own_ui() {
        let registry = FunctionRegistry::with_builtins();
        for entry in registry.catalog() {
            let spec = FunctionSpec {
                function: entry.name.to_string(),
                args: args_from_ui(&entry.ui),
            };
            let f = registry
                .build(&spec, engine())
                .unwrap_or_else(|e| panic!("{} failed to build: {}", entry.name, e));
            assert_eq!(f.name(), entry.name);
        }
    }

    #[test]
    fn test_single_column_accepts_one_item_list() {
        let registry = FunctionRegistry::with_builtins();
        let f = registry
            .build(
                &spec(json!({
                    "function": "AlertHighValue",
                    "args": {"input_item": ["pressure"], "upper_threshold": 5.0, "alert_name": ["high"]}
                })),
                engine(),
            )
            .unwrap();
        assert_eq!(f.produces(), vec!["high".to_string()]);

        let result = registry.build(
            &spec(json!({
                "function": "AlertHighValue",
                "args": {"input_item": ["a", "b"], "upper_threshold": 5.0, "alert_name": "high"}
            })),
            engine(),
        );
        assert!(matches!(
            result,
            Err(FunctionError::InvalidArgument { name, .. }) if name == "input_item"
        ));
    }
}
