//! # csw-engine: Engine Session Capability Surface
//!
//! The external time-domain simulation engine is an opaque collaborator.
//! This crate defines the narrow, typed [`EngineSession`] trait the pipeline
//! drives it through, plus the engine-facing pipeline steps:
//!
//! - [`fault::apply_fault`] — translate a scenario into the two-event fault
//!   plan (short-circuit onset, breaker trip) on the session;
//! - [`loads::apply_load_level`] — scale every load from its nominal power;
//! - [`rms::run_simulation`] — register monitored signals and execute the
//!   two-phase (initialization, dynamic) run.
//!
//! A session is always passed `&mut` by the caller: the exclusive borrow is
//! what enforces the one-active-fault-plan, strictly-sequential discipline
//! the engine requires.

pub mod fault;
pub mod loads;
pub mod rms;
pub mod session;
pub mod testing;

pub use fault::{apply_fault, FAULT_ONSET_LABEL, LINE_TRIP_LABEL};
pub use loads::apply_load_level;
pub use rms::run_simulation;
pub use session::{
    ElementHandle, EngineSession, EventKind, ExportSpec, ResultHandle, RunSettings, RunStatus,
    SamplingMode,
};
