//! In-memory graph storage
//!
//! Holds one export for the duration of a run: a node arena, the edge list, and the
//! adjacency indices the later stages need.

use super::edge::Edge;
use super::node::Node;
use super::types::NodeId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// How an edge was linked into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLink {
    /// Both endpoints are known nodes
    Linked,
    /// At least one endpoint is not a node of this export
    Dangling,
}

/// In-memory graph storage
///
/// - nodes: arena of nodes in ingest order
/// - node_index: NodeId -> arena slot
/// - incoming: arena slot -> edge slots (linked edges only)
/// - targets: every id that appears as an edge target, dangling edges included
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: HashMap<NodeId, usize>,
    incoming: Vec<Vec<usize>>,
    targets: HashSet<NodeId>,
    dangling_edges: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Node ids are unique within a store.
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::NodeAlreadyExists(node.id));
        }

        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.incoming.push(Vec::new());
        self.nodes.push(node);
        Ok(())
    }

    /// Add an edge.
    ///
    /// Endpoints are not required to exist. An edge with a missing endpoint is kept and
    /// still marks its target as having a parent, but it contributes no adjacency.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeLink {
        let slot = self.edges.len();
        self.targets.insert(edge.target.clone());

        let target = self.node_index.get(&edge.target).copied();
        let link = match target {
            Some(t) if self.node_index.contains_key(&edge.source) => {
                self.incoming[t].push(slot);
                EdgeLink::Linked
            }
            _ => {
                self.dangling_edges += 1;
                EdgeLink::Dangling
            }
        };

        self.edges.push(edge);
        link
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&slot| &self.nodes[slot])
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// All nodes in ingest order
    pub fn all_nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in ingest order, dangling ones included
    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Parent ids of a node (sources of its linked incoming edges) in ingest order.
    /// Unknown ids have no parents.
    pub fn parents(&self, id: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.node_index
            .get(id)
            .map(|&slot| self.incoming[slot].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&e| &self.edges[e].source)
    }

    /// Whether any edge, dangling or not, points at this id
    pub fn has_incoming(&self, id: &NodeId) -> bool {
        self.targets.contains(id)
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get edge count (dangling edges included)
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges with a missing endpoint
    pub fn dangling_edge_count(&self) -> usize {
        self.dangling_edges
    }
}
