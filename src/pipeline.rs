//! Batch pipeline
//!
//! Stages run in a fixed order over one fully loaded export:
//! load records, expand labels, resolve roots, build reports, write reports.
//! Every table is built before the first write, so a failing stage leaves no output.

use crate::algo::{resolve_roots, RootIndex, RootStats};
use crate::config::{ConfigError, OutputFormat, PipelineConfig};
use crate::expand::{expand_nodes, ExpandedRow};
use crate::graph::GraphStore;
use crate::ingest::{load_graph, CsvSource, GraphSource, IngestError, IngestReport};
use crate::report::{ReportBuilder, Reports};
use crate::sink::{write_reports, CsvDirSink, JsonDirSink, SinkError, TableSink};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, info};

/// Named pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadRecords,
    ProcessNodes,
    FindNodeRoots,
    BuildReports,
    WriteReports,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::LoadRecords => "Load Records",
            Stage::ProcessNodes => "Process Nodes",
            Stage::FindNodeRoots => "Find Node Roots",
            Stage::BuildReports => "Build Reports",
            Stage::WriteReports => "Write Reports",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error raised inside a stage
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Stage that failed, if the error came from one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            PipelineError::Config(_) => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Run one stage with start/finish/failure logging
fn run_stage<T, E, F>(stage: Stage, f: F) -> PipelineResult<T>
where
    E: Into<StageError>,
    F: FnOnce() -> Result<T, E>,
{
    info!("starting stage: {}", stage);
    match f() {
        Ok(value) => {
            info!("completed stage: {}", stage);
            Ok(value)
        }
        Err(e) => {
            let source = e.into();
            error!("failed stage: {}: {}", stage, source);
            Err(PipelineError::Stage { stage, source })
        }
    }
}

/// Everything computed for one export, before anything is written
#[derive(Debug)]
pub struct PipelineOutput {
    pub store: GraphStore,
    pub ingest: IngestReport,
    pub rows: Vec<ExpandedRow>,
    pub roots: RootIndex,
    pub reports: Reports,
}

impl PipelineOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ingest: self.ingest.clone(),
            expanded_rows: self.rows.len(),
            roots: self.roots.stats().clone(),
            label_tables: self.reports.nodes_by_labels.tables.len(),
            mapping_rows: self.reports.node_to_root_mapping.row_count(),
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ingest: IngestReport,
    pub expanded_rows: usize,
    pub roots: RootStats,
    pub label_tables: usize,
    pub mapping_rows: usize,
}

/// The batch pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// CSV source for the configured node and edge paths
    pub fn csv_source(&self) -> PipelineResult<CsvSource> {
        let nodes = self.config.nodes_path.as_ref().ok_or_else(|| {
            ConfigError::Invalid("nodes_path is required to read CSV input".into())
        })?;
        let edges = self.config.edges_path.as_ref().ok_or_else(|| {
            ConfigError::Invalid("edges_path is required to read CSV input".into())
        })?;
        Ok(CsvSource::new(nodes, edges))
    }

    /// Sink for the configured output directory and format
    pub fn sink(&self) -> Box<dyn TableSink> {
        match self.config.output_format {
            OutputFormat::Csv => Box::new(CsvDirSink::new(&self.config.output_dir)),
            OutputFormat::Json => Box::new(JsonDirSink::new(&self.config.output_dir)),
        }
    }

    /// Load the graph only
    pub fn load<S: GraphSource + ?Sized>(
        &self,
        source: &S,
    ) -> PipelineResult<(GraphStore, IngestReport)> {
        run_stage(Stage::LoadRecords, || load_graph(source))
    }

    /// Run every stage except writing
    pub fn process<S: GraphSource + ?Sized>(&self, source: &S) -> PipelineResult<PipelineOutput> {
        let (store, ingest) = self.load(source)?;
        let report_config = &self.config.report;

        let rows = run_stage(Stage::ProcessNodes, || {
            Ok::<_, StageError>(expand_nodes(&store, &report_config.label_separator))
        })?;
        let roots = run_stage(Stage::FindNodeRoots, || {
            Ok::<_, StageError>(resolve_roots(&store))
        })?;
        let reports = run_stage(Stage::BuildReports, || {
            Ok::<_, StageError>(ReportBuilder::new(report_config).build(&store, &rows, &roots))
        })?;

        Ok(PipelineOutput {
            store,
            ingest,
            rows,
            roots,
            reports,
        })
    }

    /// Run every stage and hand the reports to `sink`
    pub fn run<S, K>(&self, source: &S, sink: &mut K) -> PipelineResult<RunSummary>
    where
        S: GraphSource + ?Sized,
        K: TableSink + ?Sized,
    {
        let output = self.process(source)?;
        run_stage(Stage::WriteReports, || write_reports(sink, &output.reports))?;

        let summary = output.summary();
        info!(
            "Run complete: {} nodes, {} label rows, {} roots, {} mapping rows",
            summary.ingest.nodes,
            summary.expanded_rows,
            summary.roots.root_count,
            summary.mapping_rows
        );
        Ok(summary)
    }
}
