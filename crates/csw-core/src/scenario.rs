use serde::{Deserialize, Serialize};

/// One point in the sweep's parameter space.
///
/// Scenarios are generated once per sweep and are read-only afterwards. The
/// serde field names match the columns of the persisted metadata table
/// (`scenario, load_level, f_line, f_location, f_duration`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Zero-padded sequence token, e.g. `scenario_007`. The suffix width
    /// equals the digit count of the sweep's total scenario count.
    #[serde(rename = "scenario")]
    pub id: String,
    /// Multiplier applied to every load's nominal power.
    pub load_level: f64,
    /// Name of the line the short circuit is placed on.
    #[serde(rename = "f_line")]
    pub fault_line: String,
    /// Fault position along the line, in percent of its length.
    #[serde(rename = "f_location")]
    pub fault_location: f64,
    /// Seconds between fault onset and breaker trip.
    #[serde(rename = "f_duration")]
    pub fault_duration: f64,
}
