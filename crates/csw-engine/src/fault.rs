use anyhow::Result;
use csw_core::{Scenario, SweepError};

use crate::session::{EngineSession, EventKind};

/// Event label for the short-circuit onset.
pub const FAULT_ONSET_LABEL: &str = "fault_onset";
/// Event label for the breaker trip that clears the fault.
pub const LINE_TRIP_LABEL: &str = "line_trip";

/// Configure the scenario's fault plan on the session.
///
/// Validates first, mutates second: a scenario with a negative duration or
/// an unresolvable line fails with [`SweepError::InvalidDuration`] /
/// [`SweepError::InvalidTarget`] and leaves the session untouched. On the
/// success path every pre-existing event is cleared before the new plan is
/// created, so at most one fault plan is ever active.
///
/// The plan is two events against the same line: short-circuit onset at
/// t = 0 and breaker trip at t = `fault_duration`.
pub fn apply_fault<S: EngineSession + ?Sized>(session: &mut S, scenario: &Scenario) -> Result<()> {
    if scenario.fault_duration < 0.0 {
        return Err(SweepError::InvalidDuration {
            value: scenario.fault_duration,
        }
        .into());
    }
    let line = session
        .find_line(&scenario.fault_line)?
        .ok_or_else(|| SweepError::InvalidTarget {
            line: scenario.fault_line.clone(),
        })?;

    session.clear_events()?;
    session.set_line_fault_enabled(line, true)?;
    session.set_line_fault_location(line, scenario.fault_location)?;

    let onset_time = 0.0;
    session.create_event(EventKind::ShortCircuit, FAULT_ONSET_LABEL, onset_time, line)?;
    session.create_event(
        EventKind::SwitchOpen,
        LINE_TRIP_LABEL,
        onset_time + scenario.fault_duration,
        line,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSession;

    fn scenario(line: &str, duration: f64) -> Scenario {
        Scenario {
            id: "scenario_1".into(),
            load_level: 1.0,
            fault_line: line.into(),
            fault_location: 50.0,
            fault_duration: duration,
        }
    }

    #[test]
    fn creates_onset_and_trip_against_same_line() {
        let mut session = ScriptedSession::new().with_line("L1");
        apply_fault(&mut session, &scenario("L1", 0.15)).unwrap();

        assert_eq!(session.events.len(), 2);
        let onset = &session.events[0];
        let trip = &session.events[1];
        assert_eq!(onset.kind, EventKind::ShortCircuit);
        assert_eq!(trip.kind, EventKind::SwitchOpen);
        assert_eq!(onset.time_s, 0.0);
        assert_eq!(trip.time_s, onset.time_s + 0.15);
        assert_eq!(onset.target, trip.target);
    }

    #[test]
    fn clears_stale_events_before_adding_new_plan() {
        let mut session = ScriptedSession::new().with_line("L1");
        apply_fault(&mut session, &scenario("L1", 0.1)).unwrap();
        apply_fault(&mut session, &scenario("L1", 0.2)).unwrap();
        // Still exactly one onset and one trip.
        assert_eq!(session.events.len(), 2);
        assert_eq!(session.events[1].time_s, 0.2);
    }

    #[test]
    fn zero_duration_trips_at_onset() {
        let mut session = ScriptedSession::new().with_line("L1");
        apply_fault(&mut session, &scenario("L1", 0.0)).unwrap();
        assert_eq!(session.events[1].time_s, 0.0);
    }

    #[test]
    fn negative_duration_fails_without_touching_events() {
        let mut session = ScriptedSession::new().with_line("L1");
        apply_fault(&mut session, &scenario("L1", 0.1)).unwrap();
        let err = apply_fault(&mut session, &scenario("L1", -1.0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::InvalidDuration { .. })
        ));
        // The previous plan is still in place, untouched.
        assert_eq!(session.events.len(), 2);
    }

    #[test]
    fn unknown_line_fails_with_invalid_target() {
        let mut session = ScriptedSession::new().with_line("L1");
        let err = apply_fault(&mut session, &scenario("L9", 0.1)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::InvalidTarget { .. })
        ));
        assert!(session.events.is_empty());
    }

    #[test]
    fn sets_fault_flag_and_location_on_target_line() {
        let mut session = ScriptedSession::new().with_line("L1");
        apply_fault(&mut session, &scenario("L1", 0.1)).unwrap();
        let line = session.find_line("L1").unwrap().unwrap();
        let (enabled, location) = session.line_fault_state(line);
        assert!(enabled);
        assert_eq!(location, 50.0);
    }
}
