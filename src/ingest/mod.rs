//! Record ingestion
//!
//! Turns the flat node and edge rows of an export into a [`GraphStore`]. Optional
//! fields fall back to defaults; a missing mandatory column aborts the load.

pub mod record;
pub mod source;

pub use record::Record;
pub use source::{read_csv_records, read_records, CsvSource, GraphSource, MemorySource};

use crate::graph::{Edge, EdgeId, EdgeLink, GraphError, GraphStore, Node, NodeId};
use crate::parser::{parse_labels, parse_properties_lossy};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Node id column, plain and graph-database export header
pub const NODE_ID_COLUMNS: &[&str] = &["id", "id(n)"];
pub const NODE_LABELS_COLUMNS: &[&str] = &["labels", "labels(n)"];
pub const NODE_PROPERTIES_COLUMNS: &[&str] = &["properties", "properties(n)"];

pub const EDGE_ID_COLUMN: &str = "relationship_id";
pub const EDGE_TYPE_COLUMN: &str = "relationship_type";
pub const EDGE_PROPERTIES_COLUMN: &str = "relationship_properties";
pub const EDGE_SOURCE_COLUMN: &str = "source_id";
pub const EDGE_TARGET_COLUMN: &str = "target_id";

/// Relationship type used when an edge record has none
pub const DEFAULT_EDGE_TYPE: &str = "RELATED_TO";

/// Which kind of record a schema error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Node,
    Edge,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Node => write!(f, "node"),
            RecordKind::Edge => write!(f, "edge"),
        }
    }
}

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{kind} record {ordinal} is missing mandatory column '{column}'")]
    Schema {
        kind: RecordKind,
        ordinal: usize,
        column: &'static str,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Counters collected while building the graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub nodes: usize,
    pub edges: usize,
    pub dangling_edges: usize,
    /// Property blobs kept as raw text
    pub degraded_properties: usize,
    /// Nodes that received the default label
    pub defaulted_labels: usize,
}

/// Build a graph from node and edge records
pub fn build_graph(
    node_records: &[Record],
    edge_records: &[Record],
) -> IngestResult<(GraphStore, IngestReport)> {
    let mut store = GraphStore::new();
    let mut report = IngestReport::default();

    for (ordinal, record) in node_records.iter().enumerate() {
        let node = node_from_record(ordinal, record, &mut report)?;
        store.add_node(node)?;
        report.nodes += 1;
    }

    for (ordinal, record) in edge_records.iter().enumerate() {
        let edge = edge_from_record(ordinal, record, &mut report)?;
        if store.add_edge(edge) == EdgeLink::Dangling {
            report.dangling_edges += 1;
        }
        report.edges += 1;
    }

    if report.dangling_edges > 0 {
        warn!(
            "{} of {} edges reference nodes missing from the export",
            report.dangling_edges, report.edges
        );
    }
    info!(
        "Built graph: {} nodes, {} edges ({} degraded property blobs, {} defaulted labels)",
        report.nodes, report.edges, report.degraded_properties, report.defaulted_labels
    );

    Ok((store, report))
}

/// Load and build from any source
pub fn load_graph<S: GraphSource + ?Sized>(source: &S) -> IngestResult<(GraphStore, IngestReport)> {
    let nodes = source.node_records()?;
    let edges = source.edge_records()?;
    build_graph(&nodes, &edges)
}

fn node_from_record(
    ordinal: usize,
    record: &Record,
    report: &mut IngestReport,
) -> IngestResult<Node> {
    let id = record
        .get_any(NODE_ID_COLUMNS)
        .map(NodeId::parse)
        .ok_or(IngestError::Schema {
            kind: RecordKind::Node,
            ordinal,
            column: NODE_ID_COLUMNS[0],
        })?;

    let labels = parse_labels(record.get_any(NODE_LABELS_COLUMNS));
    if labels.defaulted {
        debug!("Node {} has no labels, using the default", id);
        report.defaulted_labels += 1;
    }

    let properties = parse_properties_lossy(record.get_any(NODE_PROPERTIES_COLUMNS));
    if properties.degraded {
        report.degraded_properties += 1;
    }

    Ok(Node::new_with_properties(
        id,
        labels.labels,
        properties.properties,
    ))
}

fn edge_from_record(
    ordinal: usize,
    record: &Record,
    report: &mut IngestReport,
) -> IngestResult<Edge> {
    let endpoint = |column: &'static str| {
        record
            .get(column)
            .map(NodeId::parse)
            .ok_or(IngestError::Schema {
                kind: RecordKind::Edge,
                ordinal,
                column,
            })
    };
    let source = endpoint(EDGE_SOURCE_COLUMN)?;
    let target = endpoint(EDGE_TARGET_COLUMN)?;

    let id = record
        .get(EDGE_ID_COLUMN)
        .map(EdgeId::parse)
        .unwrap_or(EdgeId::Int(ordinal as i64));
    let edge_type = record
        .get(EDGE_TYPE_COLUMN)
        .map(str::trim)
        .unwrap_or(DEFAULT_EDGE_TYPE);

    let properties = parse_properties_lossy(record.get(EDGE_PROPERTIES_COLUMN));
    if properties.degraded {
        report.degraded_properties += 1;
    }

    Ok(Edge::new_with_properties(
        id,
        source,
        target,
        edge_type,
        properties.properties,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Label, PropertyValue};

    fn node(id: &str, labels: &str, properties: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("labels", labels)
            .with("properties", properties)
    }

    fn edge(source: &str, target: &str) -> Record {
        Record::new()
            .with(EDGE_SOURCE_COLUMN, source)
            .with(EDGE_TARGET_COLUMN, target)
    }

    #[test]
    fn test_build_graph() {
        let nodes = vec![
            node("1", "[Account]", "{name: prod}"),
            node("2", "[Resource]", "{arn: \"arn:aws:iam::123:role/Foo\"}"),
        ];
        let edges = vec![edge("1", "2")
            .with(EDGE_ID_COLUMN, "10")
            .with(EDGE_TYPE_COLUMN, "RESOURCE")];

        let (store, report) = build_graph(&nodes, &edges).unwrap();
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(report.nodes, 2);
        assert_eq!(report.dangling_edges, 0);

        let account = store.get_node(&NodeId::from(1)).unwrap();
        assert_eq!(
            account.get_property("name"),
            Some(&PropertyValue::String("prod".to_string()))
        );
        let edge = &store.all_edges()[0];
        assert_eq!(edge.id, EdgeId::Int(10));
        assert_eq!(edge.edge_type.as_str(), "RESOURCE");
        assert!(store.has_incoming(&NodeId::from(2)));
    }

    #[test]
    fn test_export_header_aliases() {
        let nodes = vec![Record::new()
            .with("id(n)", "4:abc:0")
            .with("labels(n)", "[Role]")
            .with("properties(n)", "{}")];
        let (store, _) = build_graph(&nodes, &[]).unwrap();
        let node = store.get_node(&NodeId::from("4:abc:0")).unwrap();
        assert_eq!(node.labels, vec![Label::new("Role")]);
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let nodes = vec![Record::new().with("id", "1"), Record::new().with("id", "2")];
        let edges = vec![edge("1", "2")];
        let (store, report) = build_graph(&nodes, &edges).unwrap();

        let node = store.get_node(&NodeId::from(1)).unwrap();
        assert_eq!(node.labels, vec![Label::new("Unknown")]);
        assert!(node.properties.is_empty());
        assert_eq!(report.defaulted_labels, 2);

        let edge = &store.all_edges()[0];
        assert_eq!(edge.id, EdgeId::Int(0));
        assert_eq!(edge.edge_type.as_str(), DEFAULT_EDGE_TYPE);
    }

    #[test]
    fn test_missing_node_id_is_schema_error() {
        let nodes = vec![node("1", "[A]", "{}"), Record::new().with("labels", "[B]")];
        let err = build_graph(&nodes, &[]).unwrap_err();
        match err {
            IngestError::Schema {
                kind,
                ordinal,
                column,
            } => {
                assert_eq!(kind, RecordKind::Node);
                assert_eq!(ordinal, 1);
                assert_eq!(column, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_edge_target_is_schema_error() {
        let nodes = vec![node("1", "[A]", "{}")];
        let edges = vec![Record::new().with(EDGE_SOURCE_COLUMN, "1")];
        let err = build_graph(&nodes, &edges).unwrap_err();
        assert!(err.to_string().contains("target_id"));
        assert!(err.to_string().starts_with("edge record 0"));
    }

    #[test]
    fn test_duplicate_node_id_is_fatal() {
        let nodes = vec![node("1", "[A]", "{}"), node("1", "[B]", "{}")];
        let err = build_graph(&nodes, &[]).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Graph(GraphError::NodeAlreadyExists(_))
        ));
    }

    #[test]
    fn test_dangling_edges_are_counted() {
        let nodes = vec![node("1", "[A]", "{}"), node("2", "[B]", "{}")];
        let edges = vec![edge("99", "2"), edge("1", "2")];
        let (store, report) = build_graph(&nodes, &edges).unwrap();
        assert_eq!(report.dangling_edges, 1);
        assert_eq!(report.edges, 2);
        assert_eq!(store.dangling_edge_count(), 1);
        let parents: Vec<&NodeId> = store.parents(&NodeId::Int(2)).collect();
        assert_eq!(parents, vec![&NodeId::Int(1)]);
    }

    #[test]
    fn test_degraded_blobs_are_counted() {
        let nodes = vec![node("1", "[A]", "{broken")];
        let edges = vec![edge("1", "1").with(EDGE_PROPERTIES_COLUMN, "not a map")];
        let (store, report) = build_graph(&nodes, &edges).unwrap();
        assert_eq!(report.degraded_properties, 2);
        let node = store.get_node(&NodeId::from(1)).unwrap();
        assert_eq!(
            node.get_property("raw_properties"),
            Some(&PropertyValue::Raw("{broken".to_string()))
        );
    }

    #[test]
    fn test_load_graph_from_memory_source() {
        let source = MemorySource::new(vec![node("1", "[A]", "{}")], vec![]);
        let (store, report) = load_graph(&source).unwrap();
        assert_eq!(store.node_count(), 1);
        assert_eq!(report.edges, 0);
    }
}
