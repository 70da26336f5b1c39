//! # csw-core: Contingency Sweep Model Core
//!
//! Shared data model for the contingency sweep workbench: the [`Scenario`]
//! record, the monitored-signal specification, the simulation time window,
//! and the unified [`SweepError`] taxonomy.
//!
//! Everything engine-facing lives in `csw-engine`; everything that touches
//! result files lives in `csw-ts`. This crate holds only the types those
//! crates exchange.

pub mod error;
pub mod scenario;
pub mod signals;
pub mod window;

pub use error::{SimulationPhase, SweepError, SweepResult};
pub use scenario::Scenario;
pub use signals::{ElementClass, SignalGroup, SignalSpec};
pub use window::SimulationWindow;
