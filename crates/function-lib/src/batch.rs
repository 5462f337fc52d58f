//! Tabular batch passed through pipeline functions
//!
//! A batch is a set of rows indexed by `(entity_id, timestamp)` with named
//! columns of floats or booleans. Functions take a batch by value, add or
//! replace columns and hand it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FunctionError, Result};

/// Row index entry: one reading of one device at one instant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
}

impl RowKey {
    pub fn new(entity_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            entity_id: entity_id.into(),
            timestamp,
        }
    }
}

/// Column values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Float(Vec<f64>),
    Bool(Vec<bool>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            Column::Bool(_) => None,
        }
    }

    pub fn as_bools(&self) -> Option<&[bool]> {
        match self {
            Column::Bool(v) => Some(v),
            Column::Float(_) => None,
        }
    }

    /// Numeric view; booleans become 1.0 / 0.0
    pub fn to_floats(&self) -> Vec<f64> {
        match self {
            Column::Float(v) => v.clone(),
            Column::Bool(v) => v.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect(),
        }
    }

    /// Truthiness view; any non-zero float (NaN included) is `true`
    pub fn to_bools(&self) -> Vec<bool> {
        match self {
            Column::Float(v) => v.iter().map(|x| *x != 0.0).collect(),
            Column::Bool(v) => v.clone(),
        }
    }
}

/// A named column as stored in the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColumn {
    pub name: String,
    pub values: Column,
}

#[derive(Deserialize)]
struct BatchRepr {
    index: Vec<RowKey>,
    #[serde(default)]
    columns: Vec<NamedColumn>,
}

/// One scheduling unit of time-series data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BatchRepr")]
pub struct Batch {
    index: Vec<RowKey>,
    columns: Vec<NamedColumn>,
}

impl TryFrom<BatchRepr> for Batch {
    type Error = FunctionError;

    fn try_from(repr: BatchRepr) -> Result<Self> {
        let mut batch = Batch::new(repr.index);
        for column in repr.columns {
            batch.set_column(column.name, column.values)?;
        }
        Ok(batch)
    }
}

impl Batch {
    /// Create a batch with the given row index and no columns
    pub fn new(index: Vec<RowKey>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[RowKey] {
        &self.index
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.values)
            .ok_or_else(|| FunctionError::MissingColumn(name.to_string()))
    }

    pub fn floats(&self, name: &str) -> Result<&[f64]> {
        self.column(name)?
            .as_floats()
            .ok_or_else(|| FunctionError::ColumnType {
                name: name.to_string(),
                expected: "float",
            })
    }

    pub fn bools(&self, name: &str) -> Result<&[bool]> {
        self.column(name)?
            .as_bools()
            .ok_or_else(|| FunctionError::ColumnType {
                name: name.to_string(),
                expected: "bool",
            })
    }

    /// Insert a column, replacing any existing column with the same name
    /// in place so column order is preserved.
    pub fn set_column(&mut self, name: impl Into<String>, values: Column) -> Result<()> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(FunctionError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(NamedColumn { name, values }),
        }
        Ok(())
    }

    pub fn set_floats(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        self.set_column(name, Column::Float(values))
    }

    pub fn set_bools(&mut self, name: impl Into<String>, values: Vec<bool>) -> Result<()> {
        self.set_column(name, Column::Bool(values))
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos).values)
    }
}
