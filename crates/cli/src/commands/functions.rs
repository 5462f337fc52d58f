//! Function catalog commands

use anyhow::Result;
use colored::Colorize;
use function_lib::{CatalogEntry, FunctionRegistry, UiDescriptor};
use tabled::Tabled;

use crate::output::{format_datatype, print_json, print_table, OutputFormat};

/// Row for the function catalog table
#[derive(Tabled)]
struct FunctionRow {
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "Inputs")]
    inputs: String,
    #[tabled(rename = "Outputs")]
    outputs: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&CatalogEntry> for FunctionRow {
    fn from(entry: &CatalogEntry) -> Self {
        let names = |items: &[UiDescriptor]| {
            items
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Self {
            name: entry.name.to_string(),
            inputs: names(&entry.ui.inputs),
            outputs: names(&entry.ui.outputs),
            description: entry.description.to_string(),
        }
    }
}

/// Row for a function's UI descriptor table
#[derive(Tabled)]
struct DescriptorRow {
    #[tabled(rename = "Direction")]
    direction: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Type")]
    datatype: String,
    #[tabled(rename = "Cardinality From")]
    cardinality_from: String,
    #[tabled(rename = "Required")]
    required: bool,
}

impl DescriptorRow {
    fn new(direction: &'static str, d: &UiDescriptor) -> Self {
        Self {
            direction,
            name: d.name.clone(),
            kind: format!("{:?}", d.kind),
            datatype: format_datatype(d.datatype),
            cardinality_from: d.cardinality_from.clone().unwrap_or_else(|| "-".to_string()),
            required: d.required,
        }
    }
}

/// List every registered function
pub fn list_functions(registry: &FunctionRegistry, format: OutputFormat) -> Result<()> {
    let catalog = registry.catalog();

    match format {
        OutputFormat::Json => print_json(&catalog)?,
        OutputFormat::Table => {
            let rows: Vec<FunctionRow> = catalog.iter().map(FunctionRow::from).collect();
            print_table(&rows);
        }
    }

    Ok(())
}

/// Show the UI schema of one function
pub fn show_ui(registry: &FunctionRegistry, name: &str, format: OutputFormat) -> Result<()> {
    let ui = registry.ui(name)?;

    match format {
        OutputFormat::Json => print_json(&ui)?,
        OutputFormat::Table => {
            println!("{}", name.bold());
            let rows: Vec<DescriptorRow> = ui
                .inputs
                .iter()
                .map(|d| DescriptorRow::new("input", d))
                .chain(ui.outputs.iter().map(|d| DescriptorRow::new("output", d)))
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}
