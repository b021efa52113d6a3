//! Root resolution adapter
//!
//! The resolver itself lives in `graph-roots-algorithms`. This module builds its CSR
//! view from a [`GraphStore`] and maps dense indices back to node ids.

use crate::graph::{GraphStore, NodeId};
use graph_roots_algorithms::{GraphView, RootResolver};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

pub use graph_roots_algorithms::RootAssignment;

/// Summary counters of one resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootStats {
    /// Nodes with no incoming edge
    pub root_count: usize,
    /// Non-root nodes that reached a root
    pub resolved: usize,
    /// Non-root nodes that fell back to themselves
    pub unresolved: usize,
    /// Longest parent-hop distance to a resolved root
    pub max_depth: usize,
    /// Root with the most descendants and its descendant count
    pub largest_root: Option<(NodeId, usize)>,
}

/// Node id -> resolved root id, for every node of the export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootIndex {
    roots: BTreeMap<NodeId, NodeId>,
    root_set: BTreeSet<NodeId>,
    stats: RootStats,
}

impl RootIndex {
    /// Resolved root of a node
    pub fn root_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.roots.get(id)
    }

    /// Whether a node has no incoming edge
    pub fn is_root(&self, id: &NodeId) -> bool {
        self.root_set.contains(id)
    }

    pub fn root_set(&self) -> &BTreeSet<NodeId> {
        &self.root_set
    }

    /// `(node, root)` pairs ordered by node id
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.roots.iter()
    }

    /// Pairs where the node is not its own root
    pub fn mapped_pairs(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.roots.iter().filter(|(node, root)| node != root)
    }

    pub fn stats(&self) -> &RootStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Build the resolver view: nodes sorted by id, parents in edge ingest order
pub fn build_view(store: &GraphStore) -> GraphView<NodeId> {
    let mut nodes: Vec<NodeId> = store.all_nodes().iter().map(|n| n.id.clone()).collect();
    nodes.sort();

    let node_to_index: HashMap<&NodeId, usize> =
        nodes.iter().enumerate().map(|(idx, id)| (id, idx)).collect();

    let incoming: Vec<Vec<usize>> = nodes
        .iter()
        .map(|id| {
            store
                .parents(id)
                .filter_map(|parent| node_to_index.get(parent).copied())
                .collect()
        })
        .collect();

    GraphView::from_adjacency_list(nodes, incoming)
}

/// Resolve the root of every node in the store
pub fn resolve_roots(store: &GraphStore) -> RootIndex {
    let view = build_view(store);
    // Dangling edges still disqualify their target from the root set
    let is_root: Vec<bool> = view
        .index_to_node
        .iter()
        .map(|id| !store.has_incoming(id))
        .collect();

    let assignment = RootResolver::with_root_set(&view, is_root).resolve_all();
    let index = index_from_assignment(&view, &assignment);

    let stats = index.stats();
    info!(
        "Resolved roots: {} roots, {} resolved, {} unresolved, max depth {}",
        stats.root_count, stats.resolved, stats.unresolved, stats.max_depth
    );
    index
}

fn index_from_assignment(view: &GraphView<NodeId>, assignment: &RootAssignment) -> RootIndex {
    let id = |idx: usize| view.index_to_node[idx].clone();

    let roots: BTreeMap<NodeId, NodeId> = assignment
        .root_of
        .iter()
        .enumerate()
        .map(|(idx, &root)| (id(idx), id(root)))
        .collect();
    let root_set: BTreeSet<NodeId> = assignment
        .is_root
        .iter()
        .enumerate()
        .filter(|(_, r)| **r)
        .map(|(idx, _)| id(idx))
        .collect();

    let root_count = root_set.len();
    let unresolved = assignment.unresolved().count();
    let largest_root = assignment
        .descendant_counts()
        .into_iter()
        .map(|(root, count)| (id(root), count))
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

    RootIndex {
        stats: RootStats {
            root_count,
            resolved: view.node_count - root_count - unresolved,
            unresolved,
            max_depth: assignment.max_depth(),
            largest_root,
        },
        roots,
        root_set,
    }
}
