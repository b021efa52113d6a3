//! Property graph model
//!
//! This module implements the in-memory model of one export:
//! - Nodes with ordered labels and typed properties
//! - Directed, typed edges with properties
//! - A store with the adjacency and root-set bookkeeping the pipeline needs

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{EdgeLink, GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
