use anyhow::{anyhow, Context, Result};
use csw_core::{SignalSpec, SimulationWindow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The four sweep dimensions. The cartesian product of these lists is the
/// sweep's parameter space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDimensions {
    pub load_levels: Vec<f64>,
    pub fault_lines: Vec<String>,
    pub fault_locations: Vec<f64>,
    pub fault_durations: Vec<f64>,
}

impl SweepDimensions {
    /// Total scenario count: the product of the four cardinalities.
    pub fn total(&self) -> usize {
        self.load_levels.len()
            * self.fault_lines.len()
            * self.fault_locations.len()
            * self.fault_durations.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.load_levels.is_empty() {
            return Err(anyhow!("sweep declares no load levels"));
        }
        if self.fault_lines.is_empty() {
            return Err(anyhow!("sweep declares no fault lines"));
        }
        if self.fault_locations.is_empty() {
            return Err(anyhow!("sweep declares no fault locations"));
        }
        if self.fault_durations.is_empty() {
            return Err(anyhow!("sweep declares no fault durations"));
        }
        if let Some(duration) = self.fault_durations.iter().find(|d| **d < 0.0) {
            return Err(anyhow!("fault durations must be non-negative, got {duration}"));
        }
        Ok(())
    }
}

/// Everything a sweep needs besides the engine session itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub dimensions: SweepDimensions,
    pub signals: SignalSpec,
    pub window: SimulationWindow,
}

/// Load a sweep config from YAML or JSON, sniffing by extension and falling
/// back to trying both.
pub fn load_config_from_path(path: &Path) -> Result<SweepConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading sweep config '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing sweep config yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing sweep config json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing sweep config"),
    }
}
