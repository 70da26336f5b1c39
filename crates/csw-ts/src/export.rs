use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csw_core::{SignalSpec, SweepError};
use csw_engine::{ElementHandle, EngineSession, ExportSpec, ResultHandle};
use polars::prelude::*;

/// Removes the intermediate delimited file when dropped, so no temp file
/// leaks across the sweep loop even when parsing fails mid-way.
struct TempExport {
    path: PathBuf,
}

impl Drop for TempExport {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Flatten the two header rows of a raw export into single column names.
///
/// The first column is the time column and becomes `"Time"`. Every other
/// column becomes `"<variable>_<element>"`, where `<variable>` is the first
/// whitespace-delimited token of the variable cell; the engine appends units
/// after the variable name (`"s:outofstep in p.u."`) which are discarded.
pub fn flatten_headers(instance_row: &[String], variable_row: &[String]) -> Result<Vec<String>> {
    if instance_row.len() != variable_row.len() {
        return Err(SweepError::ParseFailed(format!(
            "header rows disagree on column count: {} instance labels vs {} variable labels",
            instance_row.len(),
            variable_row.len()
        ))
        .into());
    }
    let mut names = Vec::with_capacity(variable_row.len());
    for (index, (instance, variable)) in instance_row.iter().zip(variable_row).enumerate() {
        if index == 0 {
            names.push("Time".to_string());
            continue;
        }
        let token = variable.split_whitespace().next().ok_or_else(|| {
            SweepError::ParseFailed(format!("empty variable header cell at column {index}"))
        })?;
        names.push(format!("{token}_{}", instance.trim()));
    }
    Ok(names)
}

/// Export one scenario's monitored signals and persist them as a Parquet
/// artifact at `destination`.
///
/// Element selectors are resolved against the live session *now*, at export
/// time, not at registration time: the element set may only be known after
/// the run (e.g. only in-service generators). The engine writes a delimited
/// file next to the destination; it is parsed, flattened, rewritten as
/// Parquet, and removed on both success and failure paths. The Parquet file
/// itself is staged and renamed into place so a failed write leaves no
/// partial artifact.
pub fn extract_results<S: EngineSession + ?Sized>(
    session: &mut S,
    handle: &ResultHandle,
    signals: &SignalSpec,
    t_stop: f64,
    destination: &Path,
) -> Result<PathBuf> {
    let mut selection: Vec<(ElementHandle, String)> = Vec::new();
    for group in &signals.groups {
        let elements = session.resolve_elements(group.class)?;
        for variable in &group.variables {
            for element in &elements {
                selection.push((*element, variable.clone()));
            }
        }
    }

    let csv_path = destination.with_extension("csv");
    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating artifact directory '{}'", parent.display()))?;
    }
    let _cleanup = TempExport {
        path: csv_path.clone(),
    };

    let spec = ExportSpec {
        path: csv_path.clone(),
        column_separator: ',',
        decimal_separator: '.',
        include_header: true,
        selected_only: true,
        from_time: 0.0,
        to_time: t_stop,
        selection,
    };
    session
        .export_results(handle, &spec)
        .map_err(|err| SweepError::ExportFailed(err.to_string()))?;

    let names = read_flattened_header(&csv_path)?;
    let mut df = CsvReader::from_path(&csv_path)
        .map_err(|err| SweepError::ParseFailed(err.to_string()))?
        .has_header(false)
        .with_skip_rows(2)
        .finish()
        .map_err(|err| SweepError::ParseFailed(err.to_string()))?;
    if df.width() != names.len() {
        return Err(SweepError::ParseFailed(format!(
            "export has {} data columns but {} header columns",
            df.width(),
            names.len()
        ))
        .into());
    }
    df.set_column_names(&names)
        .map_err(|err| SweepError::ParseFailed(err.to_string()))?;

    write_parquet_staged(&mut df, destination)?;
    Ok(destination.to_path_buf())
}

/// Read the two header rows of the delimited export and flatten them.
fn read_flattened_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening export '{}'", path.display()))?;
    let mut records = reader.records();
    let instance_row = next_header_row(&mut records, "instance")?;
    let variable_row = next_header_row(&mut records, "variable")?;
    flatten_headers(&instance_row, &variable_row)
}

fn next_header_row(
    records: &mut csv::StringRecordsIter<'_, File>,
    which: &str,
) -> Result<Vec<String>> {
    match records.next() {
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(err)) => Err(SweepError::ParseFailed(format!(
            "reading {which} header row: {err}"
        ))
        .into()),
        None => Err(SweepError::ParseFailed(format!(
            "export is missing the {which} header row"
        ))
        .into()),
    }
}

fn write_parquet_staged(df: &mut DataFrame, destination: &Path) -> Result<()> {
    let staged = destination.with_extension("parquet.tmp");
    let mut file = File::create(&staged)
        .with_context(|| format!("creating staged artifact '{}'", staged.display()))?;
    ParquetWriter::new(&mut file)
        .finish(df)
        .map(|_| ())
        .with_context(|| format!("writing artifact '{}'", staged.display()))?;
    fs::rename(&staged, destination).with_context(|| {
        format!(
            "moving artifact '{}' into place at '{}'",
            staged.display(),
            destination.display()
        )
    })?;
    Ok(())
}
