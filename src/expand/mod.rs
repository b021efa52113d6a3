//! Label expansion
//!
//! A node with several labels appears once per label in the label-partitioned
//! reports. Expansion produces those per-label rows.

use crate::graph::{GraphStore, Label, Node, NodeId, PropertyMap, PropertyValue};
use tracing::info;

/// Column name carrying the node id inside an expanded row's properties
pub const NODE_ID_KEY: &str = "node_id";

/// One (node, label) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRow {
    pub node_id: NodeId,
    pub primary_label: Label,
    /// All labels of the node joined with the configured separator
    pub all_labels: String,
    /// Node properties with `node_id` set
    pub properties: PropertyMap,
}

/// Expand every node of the store, in ingest order
pub fn expand_nodes(store: &GraphStore, separator: &str) -> Vec<ExpandedRow> {
    let rows: Vec<ExpandedRow> = store
        .all_nodes()
        .iter()
        .flat_map(|node| expand_node(node, separator))
        .collect();
    info!(
        "Expanded {} nodes into {} label rows",
        store.node_count(),
        rows.len()
    );
    rows
}

/// One row per label of a single node
pub fn expand_node(node: &Node, separator: &str) -> Vec<ExpandedRow> {
    let all_labels = node.joined_labels(separator);
    let mut properties = node.properties.clone();
    properties.insert(NODE_ID_KEY.to_string(), PropertyValue::from(&node.id));

    node.labels
        .iter()
        .map(|label| ExpandedRow {
            node_id: node.id.clone(),
            primary_label: label.clone(),
            all_labels: all_labels.clone(),
            properties: properties.clone(),
        })
        .collect()
}
