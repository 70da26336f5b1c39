//! In-memory engine session for tests.
//!
//! [`ScriptedSession`] implements [`EngineSession`] against a small scripted
//! model: a handful of named elements, a recorded event timeline, and a
//! synthesized delimited export with the engine's two-row header shape
//! (instance labels, then variable labels with trailing units). Either run
//! phase and the export can be told to fail.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;

use anyhow::{anyhow, bail, Result};
use csw_core::ElementClass;

use crate::session::{
    ElementHandle, EngineSession, EventKind, ExportSpec, ResultHandle, RunSettings, RunStatus,
};

#[derive(Debug, Clone)]
struct ScriptedElement {
    class: ElementClass,
    name: String,
    nominal_p: f64,
    nominal_q: f64,
    in_service: bool,
}

/// One event recorded on the scripted timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub kind: EventKind,
    pub label: String,
    pub time_s: f64,
    pub target: ElementHandle,
}

#[derive(Debug, Default)]
pub struct ScriptedSession {
    elements: Vec<ScriptedElement>,
    /// Current event timeline, in creation order.
    pub events: Vec<RecordedEvent>,
    /// Every `(element, variable)` registration, in call order.
    pub registered: Vec<(ElementHandle, String)>,
    /// False if a registration arrived after a run phase had started.
    pub registration_closed_before_run: bool,
    /// Settings applied by the last `apply_run_settings` call.
    pub settings: Option<RunSettings>,
    pub fail_initialization: bool,
    pub fail_dynamic: bool,
    pub fail_export: bool,
    /// True once the dynamic phase has executed.
    pub dynamic_ran: bool,
    /// Every export request, in call order.
    pub exports: Vec<ExportSpec>,
    /// Verbatim export body; overrides synthesis when set.
    pub export_body: Option<String>,
    /// Scripted samples per `(element name, variable)`; missing entries
    /// export as zeros.
    pub signal_values: HashMap<(String, String), Vec<f64>>,
    line_fault: HashMap<u64, (bool, f64)>,
    load_power: HashMap<u64, (f64, f64)>,
    run_started: bool,
}

impl ScriptedSession {
    pub fn new() -> Self {
        ScriptedSession {
            registration_closed_before_run: true,
            ..ScriptedSession::default()
        }
    }

    fn push_element(mut self, class: ElementClass, name: &str, p: f64, q: f64) -> Self {
        self.elements.push(ScriptedElement {
            class,
            name: name.to_string(),
            nominal_p: p,
            nominal_q: q,
            in_service: true,
        });
        self
    }

    pub fn with_line(self, name: &str) -> Self {
        self.push_element(ElementClass::Line, name, 0.0, 0.0)
    }

    pub fn with_generator(self, name: &str) -> Self {
        self.push_element(ElementClass::Generator, name, 0.0, 0.0)
    }

    pub fn with_load(self, name: &str, nominal_p: f64, nominal_q: f64) -> Self {
        self.push_element(ElementClass::Load, name, nominal_p, nominal_q)
    }

    /// Script the exported samples for one `(element, variable)` pair.
    pub fn with_signal(mut self, element: &str, variable: &str, samples: &[f64]) -> Self {
        self.signal_values
            .insert((element.to_string(), variable.to_string()), samples.to_vec());
        self
    }

    /// Flip an element's in-service flag, e.g. to model a unit dropping out
    /// between run and export.
    pub fn set_in_service(&mut self, handle: ElementHandle, in_service: bool) {
        if let Some(element) = self.elements.get_mut(handle.value() as usize) {
            element.in_service = in_service;
        }
    }

    pub fn line_fault_state(&self, line: ElementHandle) -> (bool, f64) {
        self.line_fault
            .get(&line.value())
            .copied()
            .unwrap_or((false, 0.0))
    }

    pub fn load_power(&self, load: ElementHandle) -> (f64, f64) {
        self.load_power
            .get(&load.value())
            .copied()
            .unwrap_or_else(|| {
                let element = &self.elements[load.value() as usize];
                (element.nominal_p, element.nominal_q)
            })
    }

    fn element(&self, handle: ElementHandle) -> Result<&ScriptedElement> {
        self.elements
            .get(handle.value() as usize)
            .ok_or_else(|| anyhow!("unknown element handle {}", handle.value()))
    }

    fn synthesize_export(&self, spec: &ExportSpec) -> Result<String> {
        let sep = spec.column_separator;
        let mut names = Vec::with_capacity(spec.selection.len());
        for (handle, _) in &spec.selection {
            names.push(self.element(*handle)?.name.clone());
        }

        let mut body = String::new();
        // Header row 1: instance labels, time column first.
        write!(body, "All calculations")?;
        for name in &names {
            write!(body, "{sep}{name}")?;
        }
        body.push('\n');
        // Header row 2: variable labels with trailing units.
        write!(body, "b:tnow in s")?;
        for (_, variable) in &spec.selection {
            write!(body, "{sep}{variable} in p.u.")?;
        }
        body.push('\n');

        let rows = spec
            .selection
            .iter()
            .filter_map(|(handle, variable)| {
                let name = &self.elements[handle.value() as usize].name;
                self.signal_values
                    .get(&(name.clone(), variable.clone()))
                    .map(Vec::len)
            })
            .max()
            .unwrap_or(0)
            .max(4);

        for row in 0..rows {
            write!(body, "{}", spec.from_time + row as f64 * 0.1)?;
            for (handle, variable) in &spec.selection {
                let name = &self.elements[handle.value() as usize].name;
                let value = self
                    .signal_values
                    .get(&(name.clone(), variable.clone()))
                    .and_then(|samples| samples.get(row))
                    .copied()
                    .unwrap_or(0.0);
                write!(body, "{sep}{value}")?;
            }
            body.push('\n');
        }
        Ok(body)
    }
}

impl EngineSession for ScriptedSession {
    fn resolve_elements(&self, class: ElementClass) -> Result<Vec<ElementHandle>> {
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.class == class && element.in_service)
            .map(|(index, _)| ElementHandle::new(index as u64))
            .collect())
    }

    fn element_name(&self, handle: ElementHandle) -> Result<String> {
        Ok(self.element(handle)?.name.clone())
    }

    fn find_line(&self, name: &str) -> Result<Option<ElementHandle>> {
        Ok(self
            .elements
            .iter()
            .position(|element| {
                element.class == ElementClass::Line && element.in_service && element.name == name
            })
            .map(|index| ElementHandle::new(index as u64)))
    }

    fn set_line_fault_enabled(&mut self, line: ElementHandle, enabled: bool) -> Result<()> {
        let entry = self.line_fault.entry(line.value()).or_insert((false, 0.0));
        entry.0 = enabled;
        Ok(())
    }

    fn set_line_fault_location(&mut self, line: ElementHandle, percent: f64) -> Result<()> {
        let entry = self.line_fault.entry(line.value()).or_insert((false, 0.0));
        entry.1 = percent;
        Ok(())
    }

    fn load_nominal_power(&self, load: ElementHandle) -> Result<(f64, f64)> {
        let element = self.element(load)?;
        Ok((element.nominal_p, element.nominal_q))
    }

    fn set_load_power(
        &mut self,
        load: ElementHandle,
        active_mw: f64,
        reactive_mvar: f64,
    ) -> Result<()> {
        self.element(load)?;
        self.load_power
            .insert(load.value(), (active_mw, reactive_mvar));
        Ok(())
    }

    fn clear_events(&mut self) -> Result<()> {
        self.events.clear();
        Ok(())
    }

    fn create_event(
        &mut self,
        kind: EventKind,
        label: &str,
        time_s: f64,
        target: ElementHandle,
    ) -> Result<()> {
        self.element(target)?;
        self.events.push(RecordedEvent {
            kind,
            label: label.to_string(),
            time_s,
            target,
        });
        Ok(())
    }

    fn register_result_variable(&mut self, element: ElementHandle, variable: &str) -> Result<()> {
        self.element(element)?;
        if self.run_started {
            self.registration_closed_before_run = false;
        }
        self.registered.push((element, variable.to_string()));
        Ok(())
    }

    fn apply_run_settings(&mut self, settings: &RunSettings) -> Result<()> {
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn run_initialization(&mut self) -> Result<RunStatus> {
        self.run_started = true;
        if self.fail_initialization {
            Ok(RunStatus::Failed(1))
        } else {
            Ok(RunStatus::Completed)
        }
    }

    fn run_dynamic(&mut self) -> Result<RunStatus> {
        if self.fail_dynamic {
            return Ok(RunStatus::Failed(1));
        }
        self.dynamic_ran = true;
        Ok(RunStatus::Completed)
    }

    fn result_store(&self) -> ResultHandle {
        ResultHandle::new(0)
    }

    fn export_results(&mut self, _handle: &ResultHandle, spec: &ExportSpec) -> Result<()> {
        if self.fail_export {
            bail!("scripted export failure");
        }
        self.exports.push(spec.clone());
        let body = match &self.export_body {
            Some(body) => body.clone(),
            None => self.synthesize_export(spec)?,
        };
        fs::write(&spec.path, body)?;
        Ok(())
    }
}
