//! IoT pipeline function CLI
//!
//! A command-line tool for browsing the function catalog, validating
//! pipeline definitions and running them over local batch files.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{functions, pipeline, settings};
use function_lib::FunctionRegistry;
use output::{print_error, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// IoT pipeline function CLI
#[derive(Parser)]
#[command(name = "fnctl")]
#[command(author, version, about = "CLI for IoT pipeline functions", long_about = None)]
pub struct Cli {
    /// Output format (defaults to the config file setting, then table)
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse the function catalog
    #[command(subcommand)]
    Functions(FunctionsCommands),

    /// Check that a pipeline definition builds
    Validate {
        /// Pipeline definition (JSON)
        #[arg(long, short, env = "FNCTL_PIPELINE")]
        pipeline: Option<PathBuf>,
    },

    /// Run a pipeline over a batch file
    Run {
        /// Pipeline definition (JSON)
        #[arg(long, short, env = "FNCTL_PIPELINE")]
        pipeline: Option<PathBuf>,

        /// Input batch (JSON)
        #[arg(long, short)]
        batch: PathBuf,

        /// Write the resulting batch to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Manage stored defaults
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Store default options
    Set {
        /// Pipeline used when --pipeline is not given
        #[arg(long)]
        default_pipeline: Option<String>,

        /// Output format used when --format is not given
        #[arg(long)]
        default_format: Option<OutputFormat>,
    },

    /// Show stored defaults
    Show,
}

#[derive(Subcommand)]
pub enum FunctionsCommands {
    /// List registered functions
    List,

    /// Show the UI schema of a function
    Ui {
        /// Function name
        name: String,
    },
}

fn pipeline_path(arg: Option<PathBuf>, config: &config::Config) -> Result<PathBuf> {
    arg.or_else(|| config.default_pipeline.as_ref().map(PathBuf::from))
        .context("No pipeline given; pass --pipeline or set default_pipeline in the config file")
}

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    let config = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| config.default_format.as_deref().and_then(OutputFormat::parse_name))
        .unwrap_or_default();

    let registry = FunctionRegistry::with_builtins();

    match cli.command {
        Commands::Functions(cmd) => match cmd {
            FunctionsCommands::List => functions::list_functions(&registry, format)?,
            FunctionsCommands::Ui { name } => functions::show_ui(&registry, &name, format)?,
        },
        Commands::Validate { pipeline: path } => {
            let path = pipeline_path(path, &config)?;
            pipeline::validate(&registry, &path, format)?;
        }
        Commands::Run {
            pipeline: path,
            batch,
            output,
        } => {
            let path = pipeline_path(path, &config)?;
            pipeline::run(&registry, &path, &batch, output.as_deref(), format)?;
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Set {
                default_pipeline,
                default_format,
            } => settings::set(default_pipeline, default_format)?,
            ConfigCommands::Show => settings::show(format)?,
        },
    }

    Ok(())
}
