//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the graph topology for algorithm execution.
//! Root resolution only ever walks upward, so the view stores incoming adjacency.

use std::collections::HashMap;
use std::hash::Hash;

/// Default node identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// `N` is the caller's node identifier; algorithms only ever see dense indices `0..node_count`.
#[derive(Debug, Clone)]
pub struct GraphView<N = NodeId> {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to the node identifier
    pub index_to_node: Vec<N>,
    /// Mapping from node identifier to dense index
    pub node_to_index: HashMap<N, usize>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,
}

impl<N> GraphView<N> {
    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get incoming neighbors (parents) of a node, in edge insertion order
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Total number of edges in the view
    pub fn edge_count(&self) -> usize {
        self.in_sources.len()
    }
}

impl<N: Clone + Eq + Hash> GraphView<N> {
    /// Build a view from an ordered node list and `(source_idx, target_idx)` pairs.
    ///
    /// Dense index `i` is the position of the node in `nodes`. Pairs referring to an
    /// index outside `0..nodes.len()` are skipped.
    pub fn from_edges(nodes: Vec<N>, edges: &[(usize, usize)]) -> Self {
        let node_count = nodes.len();
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        for &(u, v) in edges {
            if u >= node_count || v >= node_count {
                continue;
            }
            incoming[v].push(u);
        }

        Self::from_adjacency_list(nodes, incoming)
    }

    /// Create a GraphView from per-node parent lists (`incoming[i]` = sources of edges into `i`)
    pub fn from_adjacency_list(index_to_node: Vec<N>, incoming: Vec<Vec<usize>>) -> Self {
        let node_count = index_to_node.len();
        let node_to_index: HashMap<N, usize> = index_to_node
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, id)| (id, idx))
            .collect();

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();

        in_offsets.push(0);
        for sources in incoming.into_iter().take(node_count) {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }
        // Short adjacency input still yields a well-formed offset table
        while in_offsets.len() < node_count + 1 {
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            in_offsets,
            in_sources,
        }
    }

    /// Dense index of a node identifier
    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.node_to_index.get(node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_view_projection() {
        // 10 -> 20 -> 30
        let view = GraphView::from_edges(vec![10u64, 20, 30], &[(0, 1), (1, 2)]);

        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 2);

        let n1 = view.index_of(&10).unwrap();
        let n2 = view.index_of(&20).unwrap();
        let n3 = view.index_of(&30).unwrap();

        assert_eq!(view.predecessors(n3), &[n2]);
        assert_eq!(view.predecessors(n2), &[n1]);
        assert_eq!(view.in_degree(n1), 0);
        assert_eq!(view.in_degree(n2), 1);
    }

    #[test]
    fn test_out_of_range_edges_are_skipped() {
        let view = GraphView::from_edges(vec!["a", "b"], &[(0, 1), (0, 7), (9, 1)]);
        assert_eq!(view.edge_count(), 1);
        assert_eq!(view.predecessors(1), &[0]);
    }

    #[test]
    fn test_short_adjacency_list() {
        let view = GraphView::from_adjacency_list(vec!['a', 'b', 'c'], vec![vec![], vec![0]]);
        assert_eq!(view.in_offsets.len(), 4);
        assert_eq!(view.predecessors(1), &[0]);
        assert!(view.predecessors(2).is_empty());
    }

    #[test]
    fn test_predecessors_keep_insertion_order() {
        let view = GraphView::from_edges(vec![1u64, 2, 3], &[(2, 0), (1, 0)]);
        assert_eq!(view.predecessors(0), &[2, 1]);
    }
}
