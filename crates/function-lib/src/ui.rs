//! Declarative UI schema for function configuration
//!
//! Descriptors are pure metadata: an external configuration UI renders them
//! so a user can pick column bindings and scalar values. Nothing here affects
//! `execute`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value type of a bound item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float,
    Bool,
}

/// Kind of UI control a descriptor maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// Pick one or more existing data items
    MultiItem,
    /// Enter a single scalar value
    Single,
    /// Name a list of output items
    FunctionOutMulti,
}

/// A configurable input or output of a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiDescriptor {
    pub kind: DescriptorKind,
    pub name: String,
    pub datatype: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Output list length tracks the length of this input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality_from: Option<String>,
    /// Input whose selection also names a parallel output list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_item: Option<String>,
    #[serde(default)]
    pub is_output_datatype_derived: bool,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl UiDescriptor {
    fn base(kind: DescriptorKind, name: &str, datatype: DataType) -> Self {
        Self {
            kind,
            name: name.to_string(),
            datatype,
            description: None,
            cardinality_from: None,
            output_item: None,
            is_output_datatype_derived: false,
            required: true,
        }
    }

    pub fn multi_item(name: &str, datatype: DataType) -> Self {
        Self::base(DescriptorKind::MultiItem, name, datatype)
    }

    pub fn single(name: &str, datatype: DataType) -> Self {
        Self::base(DescriptorKind::Single, name, datatype)
    }

    pub fn function_out_multi(name: &str, datatype: DataType, cardinality_from: &str) -> Self {
        let mut d = Self::base(DescriptorKind::FunctionOutMulti, name, datatype);
        d.cardinality_from = Some(cardinality_from.to_string());
        d
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Let the selected items also name an output list whose type follows
    /// the inputs
    pub fn with_output_item(mut self, output_item: &str) -> Self {
        self.output_item = Some(output_item.to_string());
        self.is_output_datatype_derived = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Input and output descriptors of one function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSchema {
    pub inputs: Vec<UiDescriptor>,
    pub outputs: Vec<UiDescriptor>,
}

impl UiSchema {
    pub fn input(&self, name: &str) -> Option<&UiDescriptor> {
        self.inputs.iter().find(|d| d.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&UiDescriptor> {
        self.outputs.iter().find(|d| d.name == name)
    }

    /// Length of the output list `output_name` given the bound arguments.
    ///
    /// The output either declares `cardinality_from`, or an input names it
    /// through `output_item`. Returns `None` when neither applies or the
    /// tracked argument is not a list.
    pub fn output_cardinality(&self, output_name: &str, args: &Map<String, Value>) -> Option<usize> {
        let source = self
            .output(output_name)
            .and_then(|d| d.cardinality_from.as_deref())
            .or_else(|| {
                self.inputs
                    .iter()
                    .find(|d| d.output_item.as_deref() == Some(output_name))
                    .map(|d| d.name.as_str())
            })?;

        args.get(source).and_then(Value::as_array).map(Vec::len)
    }
}

/// Functions that can describe their configuration UI
pub trait DescribeUi {
    fn build_ui() -> UiSchema;
}
