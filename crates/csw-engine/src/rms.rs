use anyhow::Result;
use csw_core::{SignalSpec, SimulationPhase, SimulationWindow, SweepError};

use crate::session::{EngineSession, ResultHandle, RunSettings, SamplingMode};

/// Execute one time-domain run for the session's current model state.
///
/// Every `(element, variable)` pair named by `signals` is registered against
/// the result store before anything runs; the engine only records variables
/// registered in advance. The run parameters that are not scenario-varying
/// are policy constants of this orchestrator: adaptive stepping on,
/// synchronization period equal to the step, a sample at every step.
///
/// Execution is two-phase. Initialization computes the consistent pre-event
/// operating point and must complete before the dynamic run is attempted; a
/// failure in either phase surfaces as
/// [`SweepError::SimulationFailed`] with the scenario id and phase, never a
/// silent skip. Returns a handle to the populated result store; reading
/// values is the transformer's job.
pub fn run_simulation<S: EngineSession + ?Sized>(
    session: &mut S,
    scenario_id: &str,
    signals: &SignalSpec,
    window: &SimulationWindow,
) -> Result<ResultHandle> {
    window.validate()?;

    for group in &signals.groups {
        for element in session.resolve_elements(group.class)? {
            for variable in &group.variables {
                session.register_result_variable(element, variable)?;
            }
        }
    }

    let settings = RunSettings {
        t_start: window.t_start,
        t_step: window.t_step,
        t_stop: window.t_stop,
        adaptive_step: true,
        sync_period: window.t_step,
        sampling: SamplingMode::EveryStep,
    };
    session.apply_run_settings(&settings)?;

    if !session.run_initialization()?.is_completed() {
        return Err(SweepError::SimulationFailed {
            scenario_id: scenario_id.to_string(),
            phase: SimulationPhase::Initialization,
        }
        .into());
    }
    if !session.run_dynamic()?.is_completed() {
        return Err(SweepError::SimulationFailed {
            scenario_id: scenario_id.to_string(),
            phase: SimulationPhase::DynamicRun,
        }
        .into());
    }
    Ok(session.result_store())
}
