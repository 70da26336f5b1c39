use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csw_core::Scenario;

use crate::config::SweepDimensions;
use crate::generate::expand_dimensions;

/// The durable scenario metadata table for one sweep.
///
/// A CSV file with columns `scenario, load_level, f_line, f_location,
/// f_duration`, one row per scenario, row order = generation order.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MetadataStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the stored scenario list, in row order.
    pub fn load(&self) -> Result<Vec<Scenario>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening scenario metadata '{}'", self.path.display()))?;
        let mut scenarios = Vec::new();
        for record in reader.deserialize() {
            let scenario: Scenario = record.with_context(|| {
                format!("parsing scenario metadata '{}'", self.path.display())
            })?;
            scenarios.push(scenario);
        }
        Ok(scenarios)
    }

    /// Replace the store atomically: the new table is written to a staging
    /// file and renamed into place, so a crash leaves either the old table
    /// or the new one, never a partial write.
    pub fn write_atomic(&self, scenarios: &[Scenario]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("creating metadata directory '{}'", parent.display())
                })?;
            }
        }
        let staged = self.path.with_extension("csv.tmp");
        {
            let file = File::create(&staged)
                .with_context(|| format!("creating staged metadata '{}'", staged.display()))?;
            let mut writer = csv::Writer::from_writer(file);
            for scenario in scenarios {
                writer.serialize(scenario).with_context(|| {
                    format!("writing scenario '{}' to metadata table", scenario.id)
                })?;
            }
            writer.flush().context("flushing staged metadata")?;
        }
        fs::rename(&staged, &self.path).with_context(|| {
            format!(
                "moving staged metadata '{}' into place at '{}'",
                staged.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

/// Generate the sweep's scenario list, honoring the overwrite policy.
///
/// - store absent: expand the dimensions and write the table;
/// - store present, `overwrite_confirmed` false: no regeneration — the
///   stored list is returned unchanged. Declining to overwrite is a policy
///   outcome, not an error;
/// - store present, `overwrite_confirmed` true: regenerate and replace
///   atomically.
pub fn generate_scenarios(
    dims: &SweepDimensions,
    store: &MetadataStore,
    overwrite_confirmed: bool,
) -> Result<Vec<Scenario>> {
    if store.exists() && !overwrite_confirmed {
        return store.load();
    }
    let scenarios = expand_dimensions(dims)?;
    store.write_atomic(&scenarios)?;
    Ok(scenarios)
}
