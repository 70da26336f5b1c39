use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csw_core::{Scenario, SignalSpec, SimulationWindow, SweepError};
use csw_engine::{apply_fault, apply_load_level, run_simulation, EngineSession};
use csw_ts::extract_results;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Settings for one sweep run against one engine session.
pub struct SweepRunnerConfig {
    /// Per-scenario artifacts and the manifest land here.
    pub output_root: PathBuf,
    pub signals: SignalSpec,
    pub window: SimulationWindow,
    /// Wall-clock budget per scenario. Engine calls are blocking, so the
    /// budget is checked when the pipeline returns, not preemptively.
    pub scenario_deadline: Option<Duration>,
    /// Checked between scenarios; remaining scenarios are recorded as
    /// cancelled, not silently dropped.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Outcome of one scenario within a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRecord {
    pub scenario_id: String,
    /// `ok`, `error`, or `cancelled`.
    pub status: String,
    pub error: Option<String>,
    pub artifact: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SweepManifest {
    pub created_at: DateTime<Utc>,
    pub num_scenarios: usize,
    pub success: usize,
    pub failure: usize,
    pub cancelled: usize,
    pub records: Vec<SweepRecord>,
}

/// Summary returned after the sweep so drivers can report counts and retry
/// the failed subset by scenario id.
pub struct SweepSummary {
    pub success: usize,
    pub failure: usize,
    pub cancelled: usize,
    pub manifest_path: PathBuf,
    pub records: Vec<SweepRecord>,
}

/// Run the whole sweep, strictly sequentially, against one session.
///
/// Per scenario the pipeline is: apply load level → apply fault plan → run
/// the two-phase simulation → extract the columnar artifact to
/// `<output_root>/<scenario_id>.parquet`. A failed scenario is recorded with
/// its id and error and the sweep moves on; the driver decides whether the
/// failed subset warrants a retry. A `sweep_manifest.json` with every record
/// is written to the output root.
pub fn run_sweep<S: EngineSession + ?Sized>(
    session: &mut S,
    scenarios: &[Scenario],
    config: &SweepRunnerConfig,
) -> Result<SweepSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating sweep output root '{}'",
            config.output_root.display()
        )
    })?;

    let mut records = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let artifact = config.output_root.join(format!("{}.parquet", scenario.id));
        if is_cancelled(config) {
            warn!(scenario = %scenario.id, "sweep cancelled, skipping scenario");
            records.push(SweepRecord {
                scenario_id: scenario.id.clone(),
                status: "cancelled".to_string(),
                error: Some(
                    SweepError::Cancelled {
                        scenario_id: scenario.id.clone(),
                    }
                    .to_string(),
                ),
                artifact: artifact.display().to_string(),
            });
            continue;
        }

        info!(
            scenario = %scenario.id,
            load_level = scenario.load_level,
            fault_line = %scenario.fault_line,
            "running scenario"
        );
        let started = Instant::now();
        let outcome = run_scenario(session, scenario, config, &artifact)
            .and_then(|path| check_deadline(config, scenario, started).map(|_| path));

        let (status, error) = match outcome {
            Ok(_) => ("ok".to_string(), None),
            Err(err) => {
                warn!(scenario = %scenario.id, "scenario failed: {err:#}");
                ("error".to_string(), Some(err.to_string()))
            }
        };
        records.push(SweepRecord {
            scenario_id: scenario.id.clone(),
            status,
            error,
            artifact: artifact.display().to_string(),
        });
    }

    let success = records.iter().filter(|r| r.status == "ok").count();
    let cancelled = records.iter().filter(|r| r.status == "cancelled").count();
    let failure = records.len() - success - cancelled;

    let manifest = SweepManifest {
        created_at: Utc::now(),
        num_scenarios: records.len(),
        success,
        failure,
        cancelled,
        records: records.clone(),
    };
    let manifest_path = config.output_root.join("sweep_manifest.json");
    write_sweep_manifest(&manifest_path, &manifest)?;

    info!(success, failure, cancelled, "sweep finished");
    Ok(SweepSummary {
        success,
        failure,
        cancelled,
        manifest_path,
        records,
    })
}

fn run_scenario<S: EngineSession + ?Sized>(
    session: &mut S,
    scenario: &Scenario,
    config: &SweepRunnerConfig,
    artifact: &Path,
) -> Result<PathBuf> {
    apply_load_level(session, scenario.load_level)?;
    apply_fault(session, scenario)?;
    let handle = run_simulation(session, &scenario.id, &config.signals, &config.window)?;
    extract_results(
        session,
        &handle,
        &config.signals,
        config.window.t_stop,
        artifact,
    )
}

fn is_cancelled(config: &SweepRunnerConfig) -> bool {
    config
        .cancel
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

fn check_deadline(
    config: &SweepRunnerConfig,
    scenario: &Scenario,
    started: Instant,
) -> Result<()> {
    if let Some(deadline) = config.scenario_deadline {
        let elapsed = started.elapsed();
        if elapsed > deadline {
            return Err(SweepError::DeadlineExceeded {
                scenario_id: scenario.id.clone(),
                elapsed_ms: elapsed.as_millis() as u64,
            }
            .into());
        }
    }
    Ok(())
}

pub fn write_sweep_manifest(path: &Path, manifest: &SweepManifest) -> Result<()> {
    let json =
        serde_json::to_string_pretty(manifest).context("serializing sweep manifest to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing sweep manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_sweep_manifest(path: &Path) -> Result<SweepManifest> {
    let file = File::open(path)
        .with_context(|| format!("opening sweep manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing sweep manifest '{}'", path.display()))
}
