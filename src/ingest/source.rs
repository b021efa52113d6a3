//! Graph sources: where node and edge records come from

use super::record::Record;
use super::IngestResult;
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;

/// Supplies the raw node and edge records of one export
pub trait GraphSource {
    fn node_records(&self) -> IngestResult<Vec<Record>>;
    fn edge_records(&self) -> IngestResult<Vec<Record>>;
}

/// Records already held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub nodes: Vec<Record>,
    pub edges: Vec<Record>,
}

impl MemorySource {
    pub fn new(nodes: Vec<Record>, edges: Vec<Record>) -> Self {
        Self { nodes, edges }
    }
}

impl GraphSource for MemorySource {
    fn node_records(&self) -> IngestResult<Vec<Record>> {
        Ok(self.nodes.clone())
    }

    fn edge_records(&self) -> IngestResult<Vec<Record>> {
        Ok(self.edges.clone())
    }
}

/// A pair of CSV files with header rows. Paths ending in `.gz` are decompressed.
#[derive(Debug, Clone)]
pub struct CsvSource {
    nodes_path: PathBuf,
    edges_path: PathBuf,
}

impl CsvSource {
    pub fn new(nodes_path: impl Into<PathBuf>, edges_path: impl Into<PathBuf>) -> Self {
        Self {
            nodes_path: nodes_path.into(),
            edges_path: edges_path.into(),
        }
    }

    pub fn nodes_path(&self) -> &Path {
        &self.nodes_path
    }

    pub fn edges_path(&self) -> &Path {
        &self.edges_path
    }
}

impl GraphSource for CsvSource {
    fn node_records(&self) -> IngestResult<Vec<Record>> {
        read_csv_records(&self.nodes_path)
    }

    fn edge_records(&self) -> IngestResult<Vec<Record>> {
        read_csv_records(&self.edges_path)
    }
}

/// Read every row of a headed CSV file into records
pub fn read_csv_records(path: &Path) -> IngestResult<Vec<Record>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let records = read_records(reader)?;
    info!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Read headed CSV data from any reader
pub fn read_records<R: Read>(reader: R) -> IngestResult<Vec<Record>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records: Vec<Record> = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect(),
        );
    }
    Ok(records)
}
