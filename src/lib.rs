//! Graph Roots
//!
//! Root resolution and label-partitioned reporting over property-graph exports.
//!
//! # Architecture
//!
//! A run is a single-threaded batch over one fully loaded export:
//!
//! - `ingest`: node and edge records (in memory or CSV, optionally gzip) into a [`GraphStore`]
//! - `parser`: relaxed property blobs and bracketed label lists
//! - `expand`: one row per (node, label) pair
//! - `algo`: topmost ancestor of every node, via `graph-roots-algorithms`
//! - `report`: label-partitioned tables and the node-to-root mapping
//! - `sink`: CSV or JSON output
//! - `pipeline`: stage sequencing with start/finish/failure logging
//!
//! ## Example Usage
//!
//! ```rust
//! use graph_roots::ingest::{MemorySource, Record};
//! use graph_roots::sink::MemorySink;
//! use graph_roots::{Pipeline, PipelineConfig};
//!
//! let source = MemorySource::new(
//!     vec![
//!         Record::new().with("id", "1").with("labels", "[Account]"),
//!         Record::new().with("id", "2").with("labels", "[Role, Taggable]"),
//!     ],
//!     vec![Record::new().with("source_id", "1").with("target_id", "2")],
//! );
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let mut sink = MemorySink::new();
//! let summary = pipeline.run(&source, &mut sink).unwrap();
//!
//! assert_eq!(summary.expanded_rows, 3);
//! assert_eq!(summary.mapping_rows, 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod expand;
pub mod graph;
pub mod ingest;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod sink;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Label, Node, NodeId,
    PropertyMap, PropertyValue,
};

pub use algo::{resolve_roots, RootIndex, RootStats};
pub use config::{ConfigError, ConfigResult, OutputFormat, PipelineConfig, ReportConfig};
pub use expand::{expand_nodes, ExpandedRow};
pub use ingest::{
    build_graph, load_graph, CsvSource, GraphSource, IngestError, IngestReport, IngestResult,
    MemorySource, Record,
};
pub use parser::{format_properties, parse_labels, parse_properties};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineResult, RunSummary, Stage};
pub use report::{ReportBuilder, Reports, Table, Workbook};
pub use sink::{CsvDirSink, JsonDirSink, MemorySink, SinkError, SinkResult, TableSink};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
