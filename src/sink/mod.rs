//! Report sinks
//!
//! A sink receives finished workbooks in two phases. `write_workbook` stages a
//! workbook out of sight and `commit` publishes every staged workbook together, so
//! a failed run never leaves partial output.

use crate::report::{Reports, Table, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output path {0:?} is in the way of a workbook")]
    Conflict(PathBuf),
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for finished workbooks
pub trait TableSink {
    /// Stage one workbook; nothing is visible until `commit`
    fn write_workbook(&mut self, workbook: &Workbook) -> SinkResult<()>;

    /// Publish every staged workbook
    fn commit(&mut self) -> SinkResult<()>;

    /// Drop every staged workbook
    fn discard(&mut self);
}

/// Write every workbook of a run, all or nothing
pub fn write_reports<S: TableSink + ?Sized>(sink: &mut S, reports: &Reports) -> SinkResult<()> {
    for workbook in reports.workbooks() {
        if let Err(e) = sink.write_workbook(workbook) {
            sink.discard();
            return Err(e);
        }
    }
    sink.commit()
}

/// Keeps workbooks in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub workbooks: Vec<Workbook>,
    pending: Vec<Workbook>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workbook(&self, name: &str) -> Option<&Workbook> {
        self.workbooks.iter().find(|w| w.name == name)
    }
}

impl TableSink for MemorySink {
    fn write_workbook(&mut self, workbook: &Workbook) -> SinkResult<()> {
        self.pending.push(workbook.clone());
        Ok(())
    }

    fn commit(&mut self) -> SinkResult<()> {
        self.workbooks.append(&mut self.pending);
        Ok(())
    }

    fn discard(&mut self) {
        self.pending.clear();
    }
}

/// Staged output paths waiting to replace their targets
#[derive(Debug, Default)]
struct Staging {
    /// (staging path, target path, workbook name)
    entries: Vec<(PathBuf, PathBuf, String)>,
}

impl Staging {
    fn push(&mut self, staging: PathBuf, target: PathBuf, workbook: &str) {
        self.entries.push((staging, target, workbook.to_string()));
    }

    /// Move every staged path onto its target. Targets must all be directories or
    /// all be files (`dirs`); anything else in the way fails before the first rename.
    fn commit(&mut self, dirs: bool) -> SinkResult<()> {
        let entries = std::mem::take(&mut self.entries);

        for (_, target, _) in &entries {
            if target.exists() && target.is_dir() != dirs {
                discard_paths(entries.iter().map(|(staging, _, _)| staging));
                return Err(SinkError::Conflict(target.clone()));
            }
        }

        let mut committed: Vec<&PathBuf> = Vec::new();
        for (i, (staging, target, workbook)) in entries.iter().enumerate() {
            if let Err(e) = replace_path(staging, target) {
                // Roll back: earlier workbooks of this run must not survive
                discard_paths(committed.iter().copied());
                discard_paths(entries[i..].iter().map(|(staging, _, _)| staging));
                return Err(e.into());
            }
            info!("Published workbook '{}' to {:?}", workbook, target);
            committed.push(target);
        }
        Ok(())
    }

    fn discard(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        discard_paths(entries.iter().map(|(staging, _, _)| staging));
    }
}

fn replace_path(staging: &Path, target: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        fs::remove_dir_all(target)?;
    } else if target.exists() {
        fs::remove_file(target)?;
    }
    fs::rename(staging, target)
}

fn discard_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        let result = if path.is_dir() {
            fs::remove_dir_all(path)
        } else if path.exists() {
            fs::remove_file(path)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            warn!("Could not remove {:?}: {}", path, e);
        }
    }
}

/// Writes `<dir>/<workbook>/<table>.csv`
#[derive(Debug)]
pub struct CsvDirSink {
    dir: PathBuf,
    staging: Staging,
}

impl CsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            staging: Staging::default(),
        }
    }

    pub fn workbook_dir(&self, workbook: &str) -> PathBuf {
        self.dir.join(workbook)
    }
}

impl TableSink for CsvDirSink {
    fn write_workbook(&mut self, workbook: &Workbook) -> SinkResult<()> {
        fs::create_dir_all(&self.dir)?;

        let staging = self.dir.join(format!(".{}.partial", workbook.name));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;
        // Registered before the tables so a failed table write is cleaned up too
        let target = self.workbook_dir(&workbook.name);
        self.staging.push(staging.clone(), target, &workbook.name);
        for table in &workbook.tables {
            write_csv_table(&staging.join(format!("{}.csv", table.name)), table)?;
        }

        info!(
            "Staged workbook '{}' ({} tables) in {:?}",
            workbook.name,
            workbook.tables.len(),
            staging
        );
        Ok(())
    }

    fn commit(&mut self) -> SinkResult<()> {
        self.staging.commit(true)
    }

    fn discard(&mut self) {
        self.staging.discard();
    }
}

/// Write one table as a headed CSV file; null cells are empty
pub fn write_csv_table(path: &Path, table: &Table) -> SinkResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `<dir>/<workbook>.json`: table name -> array of row objects
#[derive(Debug)]
pub struct JsonDirSink {
    dir: PathBuf,
    staging: Staging,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            staging: Staging::default(),
        }
    }

    pub fn workbook_path(&self, workbook: &str) -> PathBuf {
        self.dir.join(format!("{}.json", workbook))
    }
}

impl TableSink for JsonDirSink {
    fn write_workbook(&mut self, workbook: &Workbook) -> SinkResult<()> {
        fs::create_dir_all(&self.dir)?;

        let document = workbook_to_json(workbook)?;
        let staging = self.dir.join(format!(".{}.json.partial", workbook.name));
        let target = self.workbook_path(&workbook.name);
        self.staging.push(staging.clone(), target, &workbook.name);
        fs::write(&staging, serde_json::to_vec_pretty(&document)?)?;

        info!(
            "Staged workbook '{}' ({} tables) in {:?}",
            workbook.name,
            workbook.tables.len(),
            staging
        );
        Ok(())
    }

    fn commit(&mut self) -> SinkResult<()> {
        self.staging.commit(false)
    }

    fn discard(&mut self) {
        self.staging.discard();
    }
}

/// JSON object keyed by table name
pub fn workbook_to_json(workbook: &Workbook) -> SinkResult<serde_json::Value> {
    let mut tables = serde_json::Map::new();
    for table in &workbook.tables {
        let mut rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let mut object = serde_json::Map::new();
            for (column, cell) in table.columns.iter().zip(row) {
                object.insert(column.clone(), serde_json::to_value(cell)?);
            }
            rows.push(serde_json::Value::Object(object));
        }
        tables.insert(table.name.clone(), serde_json::Value::Array(rows));
    }
    Ok(serde_json::Value::Object(tables))
}
