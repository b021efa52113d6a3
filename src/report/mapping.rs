//! Node-to-root mapping table

use super::{Cell, Table, NODE_TO_ROOT_MAPPING};
use crate::algo::RootIndex;
use crate::expand::ExpandedRow;
use crate::graph::{NodeId, PropertyValue};
use std::collections::HashMap;

pub const MAPPING_COLUMNS: [&str; 6] = [
    "node_id",
    "node_label",
    "root_id",
    "root_label",
    "node_all_labels",
    "root_all_labels",
];

/// One row per node whose root is a different node, ordered by node id.
///
/// Labels come from the first expanded row of each side.
pub fn build_mapping_table(rows: &[ExpandedRow], roots: &RootIndex) -> Table {
    let mut first_rows: HashMap<&NodeId, &ExpandedRow> = HashMap::with_capacity(rows.len());
    for row in rows {
        first_rows.entry(&row.node_id).or_insert(row);
    }

    let labels = |id: &NodeId| -> (Cell, Cell) {
        match first_rows.get(id) {
            Some(row) => (
                PropertyValue::String(row.primary_label.to_string()),
                PropertyValue::String(row.all_labels.clone()),
            ),
            None => (Cell::Null, Cell::Null),
        }
    };

    let mut table = Table::new(
        NODE_TO_ROOT_MAPPING,
        MAPPING_COLUMNS.iter().map(|c| c.to_string()).collect(),
    );
    for (node, root) in roots.mapped_pairs() {
        let (node_label, node_all_labels) = labels(node);
        let (root_label, root_all_labels) = labels(root);
        table.push_row(vec![
            PropertyValue::from(node),
            node_label,
            PropertyValue::from(root),
            root_label,
            node_all_labels,
            root_all_labels,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::resolve_roots;
    use crate::expand::expand_nodes;
    use crate::graph::{Edge, GraphStore, Label, Node};

    #[test]
    fn test_mapping_rows() {
        let mut store = GraphStore::new();
        store.add_node(Node::new(3, "Account")).unwrap();
        store
            .add_node(Node::new_with_labels(
                1,
                vec![Label::new("Role"), Label::new("Taggable")],
            ))
            .unwrap();
        store.add_node(Node::new(2, "Policy")).unwrap();
        store.add_edge(Edge::new(0, 3, 1, "RESOURCE"));
        store.add_edge(Edge::new(1, 1, 2, "ATTACHED"));

        let rows = expand_nodes(&store, "|");
        let table = build_mapping_table(&rows, &resolve_roots(&store));

        assert_eq!(table.columns, MAPPING_COLUMNS.to_vec());
        assert_eq!(table.row_count(), 2);
        // Ordered by node id; the root maps to itself and is excluded
        assert_eq!(table.cell(0, "node_id"), Some(&Cell::Integer(1)));
        assert_eq!(
            table.cell(0, "node_label"),
            Some(&Cell::String("Role".to_string()))
        );
        assert_eq!(
            table.cell(0, "node_all_labels"),
            Some(&Cell::String("Role|Taggable".to_string()))
        );
        assert_eq!(table.cell(1, "node_id"), Some(&Cell::Integer(2)));
        assert_eq!(table.cell(1, "root_id"), Some(&Cell::Integer(3)));
        assert_eq!(
            table.cell(1, "root_label"),
            Some(&Cell::String("Account".to_string()))
        );
    }

    #[test]
    fn test_cycle_produces_no_rows() {
        let mut store = GraphStore::new();
        store.add_node(Node::new("a", "X")).unwrap();
        store.add_node(Node::new("b", "X")).unwrap();
        store.add_edge(Edge::new(0, "a", "b", "R"));
        store.add_edge(Edge::new(1, "b", "a", "R"));

        let rows = expand_nodes(&store, "|");
        let table = build_mapping_table(&rows, &resolve_roots(&store));
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns.len(), 6);
    }
}
