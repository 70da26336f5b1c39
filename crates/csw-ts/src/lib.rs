//! # csw-ts: Result Transformation and Stability Classification
//!
//! Turns the engine's raw delimited exports into columnar result artifacts
//! and derives stability verdicts from them.
//!
//! - [`export::extract_results`] — export the monitored signals for one
//!   scenario, flatten the two-level header, write Parquet, and remove the
//!   intermediate delimited file on every exit path.
//! - [`stability::classify_artifact`] — read one artifact and derive a
//!   stable/unstable verdict from the generator out-of-step columns.
//!
//! The two halves are decoupled: classification only needs the artifact
//! file, never a live engine session.

pub mod export;
pub mod stability;

pub use export::{extract_results, flatten_headers};
pub use stability::{classify_artifact, StabilityStatus, StabilityVerdict, OUT_OF_STEP_TOKEN};
