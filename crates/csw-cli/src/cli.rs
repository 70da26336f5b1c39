use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csw", version, about = "Contingency sweep workbench")]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the sweep's scenario metadata table, or load it if present.
    Generate {
        /// Sweep config file (YAML or JSON).
        #[arg(long)]
        config: PathBuf,
        /// Scenario metadata table (CSV) to create.
        #[arg(long)]
        out: PathBuf,
        /// Confirm replacing an existing metadata table. Without this flag
        /// an existing table is loaded unchanged.
        #[arg(long)]
        overwrite: bool,
    },
    /// Classify one result artifact and print the verdict as JSON.
    Classify {
        /// Parquet result artifact.
        artifact: PathBuf,
        /// Filter rows by scenario tag when the artifact holds several.
        #[arg(long)]
        scenario: Option<String>,
    },
    /// Classify every artifact under a sweep output directory.
    Verdicts {
        /// Directory holding `<scenario_id>.parquet` artifacts.
        dir: PathBuf,
    },
}
