use anyhow::Result;
use csw_core::Scenario;

use crate::config::SweepDimensions;

/// Expand the sweep dimensions into the full ordered scenario list.
///
/// Iteration order is fixed and fully deterministic: load level is the
/// outermost dimension, then fault line, fault location, and fault duration
/// innermost. Ids are assigned in that order as `scenario_<seq>`, zero-padded
/// to the digit count of the total scenario count.
pub fn expand_dimensions(dims: &SweepDimensions) -> Result<Vec<Scenario>> {
    dims.validate()?;
    let total = dims.total();
    let width = total.to_string().len();
    let mut scenarios = Vec::with_capacity(total);
    let mut seq = 0usize;
    for &load_level in &dims.load_levels {
        for fault_line in &dims.fault_lines {
            for &fault_location in &dims.fault_locations {
                for &fault_duration in &dims.fault_durations {
                    seq += 1;
                    scenarios.push(Scenario {
                        id: format!("scenario_{seq:0width$}"),
                        load_level,
                        fault_line: fault_line.clone(),
                        fault_location,
                        fault_duration,
                    });
                }
            }
        }
    }
    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dims() -> SweepDimensions {
        SweepDimensions {
            load_levels: vec![0.5, 1.0],
            fault_lines: vec!["L1".into(), "L2".into()],
            fault_locations: vec![0.0, 50.0, 100.0],
            fault_durations: vec![0.1, 0.2],
        }
    }

    #[test]
    fn produces_full_cartesian_product_with_padded_ids() {
        let scenarios = expand_dimensions(&dims()).unwrap();
        assert_eq!(scenarios.len(), 24);
        assert_eq!(scenarios.first().unwrap().id, "scenario_01");
        assert_eq!(scenarios.last().unwrap().id, "scenario_24");

        let ids: HashSet<_> = scenarios.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), 24);
    }

    #[test]
    fn load_level_is_the_outer_loop() {
        let scenarios = expand_dimensions(&dims()).unwrap();
        // First half of the sweep is the first load level.
        assert!(scenarios[..12].iter().all(|s| s.load_level == 0.5));
        assert!(scenarios[12..].iter().all(|s| s.load_level == 1.0));
        // Duration is the innermost dimension.
        assert_eq!(scenarios[0].fault_duration, 0.1);
        assert_eq!(scenarios[1].fault_duration, 0.2);
        assert_eq!(scenarios[0].fault_location, scenarios[1].fault_location);
        // Then location, then line.
        assert_eq!(scenarios[2].fault_location, 50.0);
        assert_eq!(scenarios[6].fault_line, "L2");
    }

    #[test]
    fn pad_width_tracks_total_count() {
        let mut small = dims();
        small.load_levels = vec![1.0];
        small.fault_lines = vec!["L1".into()];
        small.fault_locations = vec![50.0];
        small.fault_durations = vec![0.1, 0.2, 0.3];
        let scenarios = expand_dimensions(&small).unwrap();
        assert_eq!(scenarios[0].id, "scenario_1");

        small.fault_durations = (0..10).map(|i| i as f64 / 10.0).collect();
        let scenarios = expand_dimensions(&small).unwrap();
        assert_eq!(scenarios[0].id, "scenario_01");
        assert_eq!(scenarios[9].id, "scenario_10");
    }

    #[test]
    fn generation_is_deterministic() {
        let first = expand_dimensions(&dims()).unwrap();
        let second = expand_dimensions(&dims()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_empty_dimension() {
        let mut bad = dims();
        bad.fault_locations.clear();
        assert!(expand_dimensions(&bad).is_err());
    }
}
