//! Unified error types for the contingency sweep pipeline.
//!
//! Components return `anyhow::Result` and embed [`SweepError`] values at the
//! points the taxonomy names, so callers can downcast when they need to
//! distinguish a failed simulation from a failed export. Every variant that
//! can occur mid-sweep carries the scenario identifier, so a failed sweep of
//! N scenarios can be resumed for only the failed subset.

use std::fmt;

use thiserror::Error;

/// Phase of a time-domain run, used to report where a scenario failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// Computes the consistent pre-event operating point.
    Initialization,
    /// The transient run itself.
    DynamicRun,
}

impl SimulationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationPhase::Initialization => "initialization",
            SimulationPhase::DynamicRun => "dynamic-run",
        }
    }
}

impl fmt::Display for SimulationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy for the sweep pipeline.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The named fault line does not resolve on the engine session.
    #[error("fault target '{line}' is not resolvable on the engine session")]
    InvalidTarget { line: String },

    /// Fault durations are physical times and cannot be negative.
    #[error("fault duration must be non-negative, got {value}")]
    InvalidDuration { value: f64 },

    /// The engine reported a failure status in one of the two run phases.
    #[error("simulation failed for '{scenario_id}' during {phase}")]
    SimulationFailed {
        scenario_id: String,
        phase: SimulationPhase,
    },

    /// The engine's delimited export call errored.
    #[error("result export failed: {0}")]
    ExportFailed(String),

    /// The exported table violated the expected two-row-header shape.
    #[error("result export parse failed: {0}")]
    ParseFailed(String),

    /// A result artifact could not be loaded or queried.
    #[error("dataset load failed: {0}")]
    DatasetLoad(String),

    /// The sweep was cancelled before this scenario started.
    #[error("sweep cancelled before '{scenario_id}'")]
    Cancelled { scenario_id: String },

    /// The per-scenario wall-clock budget was exceeded.
    #[error("scenario '{scenario_id}' exceeded its deadline ({elapsed_ms} ms)")]
    DeadlineExceeded {
        scenario_id: String,
        elapsed_ms: u64,
    },

    /// I/O errors (metadata store, artifacts, intermediate files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for Results using [`SweepError`].
pub type SweepResult<T> = Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_failure_names_scenario_and_phase() {
        let err = SweepError::SimulationFailed {
            scenario_id: "scenario_07".into(),
            phase: SimulationPhase::Initialization,
        };
        let text = err.to_string();
        assert!(text.contains("scenario_07"));
        assert!(text.contains("initialization"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SweepError = io_err.into();
        assert!(matches!(err, SweepError::Io(_)));
    }

    #[test]
    fn downcasts_through_anyhow() {
        let err = anyhow::Error::from(SweepError::InvalidDuration { value: -1.0 });
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::InvalidDuration { .. })
        ));
    }
}
