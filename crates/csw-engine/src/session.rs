use std::path::PathBuf;

use anyhow::Result;
use csw_core::ElementClass;

/// Opaque reference to one element inside an engine session.
///
/// Handles are only meaningful to the session that produced them and only
/// for the lifetime of that session's model state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        ElementHandle(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Opaque reference to the session's populated result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultHandle(u64);

impl ResultHandle {
    pub fn new(raw: u64) -> Self {
        ResultHandle(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Kinds of timeline events the pipeline schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Short circuit applied to the target element.
    ShortCircuit,
    /// Breaker switch opening, taking the target out of service.
    SwitchOpen,
}

/// Outcome of one engine run phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Engine-side failure code; the pipeline only cares that it is a failure.
    Failed(i32),
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// How the engine samples results during the dynamic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Record a sample at every integration step.
    EveryStep,
    /// Record only at synchronization points.
    SyncPeriodOnly,
}

/// Time-domain run parameters applied before execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub t_start: f64,
    pub t_step: f64,
    pub t_stop: f64,
    pub adaptive_step: bool,
    pub sync_period: f64,
    pub sampling: SamplingMode,
}

/// Parameters of one delimited result export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpec {
    /// Where the engine writes the delimited file.
    pub path: PathBuf,
    pub column_separator: char,
    pub decimal_separator: char,
    /// Include the two header rows (instance labels, variable labels).
    pub include_header: bool,
    /// Export only the selected variables, not the whole store.
    pub selected_only: bool,
    pub from_time: f64,
    pub to_time: f64,
    /// Ordered `(element, variable)` pairs; fixes the exported column order,
    /// after the leading time column.
    pub selection: Vec<(ElementHandle, String)>,
}

/// Capability surface of one live engine session.
///
/// Methods are typed per element kind instead of exposing the engine's
/// generic attribute get/set, so the pipeline cannot reach attributes it has
/// no business touching and test doubles stay small. All calls are blocking;
/// the `&mut self` receivers serialize every mutation on one session.
pub trait EngineSession {
    /// All in-service elements of a class, in the session's model order.
    fn resolve_elements(&self, class: ElementClass) -> Result<Vec<ElementHandle>>;

    /// Display name of an element, as it appears in exported headers.
    fn element_name(&self, handle: ElementHandle) -> Result<String>;

    /// Look up a line by name. `None` means the name does not resolve.
    fn find_line(&self, name: &str) -> Result<Option<ElementHandle>>;

    /// Mark a line as short-circuit capable.
    fn set_line_fault_enabled(&mut self, line: ElementHandle, enabled: bool) -> Result<()>;

    /// Fault position along the line, in percent of its length.
    fn set_line_fault_location(&mut self, line: ElementHandle, percent: f64) -> Result<()>;

    /// Nominal `(P, Q)` of a load, the baseline that load levels scale.
    fn load_nominal_power(&self, load: ElementHandle) -> Result<(f64, f64)>;

    fn set_load_power(&mut self, load: ElementHandle, active_mw: f64, reactive_mvar: f64)
        -> Result<()>;

    /// Delete every event on the session's event timeline.
    fn clear_events(&mut self) -> Result<()>;

    fn create_event(
        &mut self,
        kind: EventKind,
        label: &str,
        time_s: f64,
        target: ElementHandle,
    ) -> Result<()>;

    /// Register a variable in the result store. The engine only records
    /// variables registered before the run starts.
    fn register_result_variable(&mut self, element: ElementHandle, variable: &str) -> Result<()>;

    fn apply_run_settings(&mut self, settings: &RunSettings) -> Result<()>;

    /// Initialization phase: compute the consistent pre-event operating point.
    fn run_initialization(&mut self) -> Result<RunStatus>;

    /// Dynamic phase. Only valid after a completed initialization.
    fn run_dynamic(&mut self) -> Result<RunStatus>;

    /// Handle to the result store populated by the last run.
    fn result_store(&self) -> ResultHandle;

    /// Write a delimited export of the selected variables to `spec.path`.
    fn export_results(&mut self, handle: &ResultHandle, spec: &ExportSpec) -> Result<()>;
}
