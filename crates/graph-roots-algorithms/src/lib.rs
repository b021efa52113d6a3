//! Graph algorithms for graph-roots
//!
//! Algorithms run over [`GraphView`], a dense CSR projection of the graph built once
//! per run by the caller.

pub mod common;
pub mod roots;

pub use common::{GraphView, NodeId};
pub use roots::{resolve_roots, RootAssignment, RootResolver};
