use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use anyhow::Result;
use csw_core::SweepError;
use polars::prelude::*;
use serde::Serialize;

/// Substring marking a generator out-of-step indicator column.
pub const OUT_OF_STEP_TOKEN: &str = "s:outofstep";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityStatus {
    /// Every generator stayed in synchronism for the whole run.
    Stable,
    /// At least one generator left synchronism at least once.
    Unstable,
    /// The artifact (after filtering) holds no samples to judge from.
    Indeterminate,
}

impl StabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityStatus::Stable => "stable",
            StabilityStatus::Unstable => "unstable",
            StabilityStatus::Indeterminate => "indeterminate",
        }
    }
}

/// Stability verdict for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityVerdict {
    pub scenario_id: String,
    pub status: StabilityStatus,
    /// Generators with a non-zero out-of-step sum, sorted ascending.
    pub collapsed_generators: Vec<String>,
}

/// Classify one columnar result artifact.
///
/// Selects every column containing [`OUT_OF_STEP_TOKEN`] and sums it over
/// all time samples; a non-zero sum means that generator left synchronism at
/// least once during the run. The generator name is the suffix after the
/// last `_` in the column name.
///
/// `scenario` filters on a `scenario` tag column for artifacts that hold
/// several scenarios; a filter that matches zero rows is valid input and
/// yields [`StabilityStatus::Indeterminate`], not an error. Load and query
/// failures (missing file, corrupt artifact, missing tag column) surface as
/// [`SweepError::DatasetLoad`].
pub fn classify_artifact(path: &Path, scenario: Option<&str>) -> Result<StabilityVerdict> {
    let file = File::open(path).map_err(|err| {
        SweepError::DatasetLoad(format!("opening artifact '{}': {err}", path.display()))
    })?;
    let mut df = ParquetReader::new(file).finish().map_err(|err| {
        SweepError::DatasetLoad(format!("reading artifact '{}': {err}", path.display()))
    })?;

    if let Some(tag) = scenario {
        if !df.get_column_names().contains(&"scenario") {
            return Err(SweepError::DatasetLoad(format!(
                "artifact '{}' has no 'scenario' column to filter on",
                path.display()
            ))
            .into());
        }
        df = df
            .lazy()
            .filter(col("scenario").eq(lit(tag)))
            .collect()
            .map_err(|err| {
                SweepError::DatasetLoad(format!("filtering scenario '{tag}': {err}"))
            })?;
    }

    let scenario_id = match scenario {
        Some(tag) => tag.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    if df.height() == 0 {
        return Ok(StabilityVerdict {
            scenario_id,
            status: StabilityStatus::Indeterminate,
            collapsed_generators: Vec::new(),
        });
    }

    let mut collapsed = BTreeSet::new();
    for name in df.get_column_names() {
        if !name.contains(OUT_OF_STEP_TOKEN) {
            continue;
        }
        let sum = df.column(name)?.sum::<f64>().unwrap_or(0.0);
        if sum != 0.0 {
            let generator = name.rsplit('_').next().unwrap_or(name);
            collapsed.insert(generator.to_string());
        }
    }

    let status = if collapsed.is_empty() {
        StabilityStatus::Stable
    } else {
        StabilityStatus::Unstable
    };
    Ok(StabilityVerdict {
        scenario_id,
        status,
        collapsed_generators: collapsed.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_artifact(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        ParquetWriter::new(&mut file).finish(df).unwrap();
        path
    }

    #[test]
    fn all_zero_columns_classify_stable() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "Time" => &[0.0, 0.1, 0.2],
            "s:outofstep_GEN1" => &[0.0, 0.0, 0.0],
            "s:outofstep_GEN2" => &[0.0, 0.0, 0.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "scenario_01.parquet", &mut df);

        let verdict = classify_artifact(&path, None).unwrap();
        assert_eq!(verdict.scenario_id, "scenario_01");
        assert_eq!(verdict.status, StabilityStatus::Stable);
        assert!(verdict.collapsed_generators.is_empty());
    }

    #[test]
    fn single_nonzero_sample_collapses_that_generator() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "Time" => &[0.0, 0.1, 0.2],
            "s:outofstep_GEN1" => &[0.0, 0.0, 0.0],
            "s:outofstep_GEN2" => &[0.0, 1.0, 0.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "scenario_02.parquet", &mut df);

        let verdict = classify_artifact(&path, None).unwrap();
        assert_eq!(verdict.status, StabilityStatus::Unstable);
        assert_eq!(verdict.collapsed_generators, vec!["GEN2".to_string()]);
    }

    #[test]
    fn collapsed_generators_are_sorted() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "Time" => &[0.0, 0.1],
            "s:outofstep_GEN_C" => &[1.0, 0.0],
            "s:outofstep_GEN_A" => &[0.0, 1.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "scenario_03.parquet", &mut df);

        let verdict = classify_artifact(&path, None).unwrap();
        // Suffix after the last `_`, sorted ascending.
        assert_eq!(
            verdict.collapsed_generators,
            vec!["A".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn non_indicator_columns_are_ignored() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "Time" => &[0.0, 0.1],
            "s:firel_GEN1" => &[5.0, 5.0],
            "s:outofstep_GEN1" => &[0.0, 0.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "scenario_04.parquet", &mut df);

        let verdict = classify_artifact(&path, None).unwrap();
        assert_eq!(verdict.status, StabilityStatus::Stable);
    }

    #[test]
    fn scenario_filter_selects_matching_rows() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "scenario" => &["scenario_01", "scenario_01", "scenario_02"],
            "Time" => &[0.0, 0.1, 0.0],
            "s:outofstep_GEN1" => &[0.0, 0.0, 1.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "sweep.parquet", &mut df);

        let verdict = classify_artifact(&path, Some("scenario_01")).unwrap();
        assert_eq!(verdict.scenario_id, "scenario_01");
        assert_eq!(verdict.status, StabilityStatus::Stable);

        let verdict = classify_artifact(&path, Some("scenario_02")).unwrap();
        assert_eq!(verdict.status, StabilityStatus::Unstable);
        assert_eq!(verdict.collapsed_generators, vec!["GEN1".to_string()]);
    }

    #[test]
    fn filter_matching_zero_rows_is_indeterminate_not_error() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "scenario" => &["scenario_01"],
            "Time" => &[0.0],
            "s:outofstep_GEN1" => &[0.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "sweep.parquet", &mut df);

        let verdict = classify_artifact(&path, Some("scenario_99")).unwrap();
        assert_eq!(verdict.status, StabilityStatus::Indeterminate);
        assert!(verdict.collapsed_generators.is_empty());
    }

    #[test]
    fn missing_artifact_is_dataset_load_error() {
        let err = classify_artifact(Path::new("does/not/exist.parquet"), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::DatasetLoad(_))
        ));
    }

    #[test]
    fn filter_without_scenario_column_is_dataset_load_error() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "Time" => &[0.0],
            "s:outofstep_GEN1" => &[0.0],
        ]
        .unwrap();
        let path = write_artifact(dir.path(), "scenario_01.parquet", &mut df);

        let err = classify_artifact(&path, Some("scenario_01")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::DatasetLoad(_))
        ));
    }
}
