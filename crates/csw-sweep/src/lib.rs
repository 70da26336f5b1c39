//! # csw-sweep: Scenario Generation and Sweep Execution
//!
//! Owns the sweep's parameter space and its execution order:
//!
//! - [`config`] — sweep configuration file (dimensions, signals, window);
//! - [`generate`] — cartesian expansion of the sweep dimensions into
//!   uniquely-identified scenarios;
//! - [`store`] — the durable scenario metadata table with explicit
//!   overwrite confirmation and atomic replacement;
//! - [`runner`] — the strictly sequential per-session sweep loop and its
//!   JSON manifest.

pub mod config;
pub mod generate;
pub mod runner;
pub mod store;

pub use config::{load_config_from_path, SweepConfig, SweepDimensions};
pub use generate::expand_dimensions;
pub use runner::{
    load_sweep_manifest, run_sweep, SweepManifest, SweepRecord, SweepRunnerConfig, SweepSummary,
};
pub use store::{generate_scenarios, MetadataStore};
