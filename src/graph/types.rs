//! Core type definitions for the graph model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node as it appears in the export
///
/// Exports use integer ids, but nothing forbids textual ones. Text that parses as an
/// `i64` becomes [`NodeId::Int`]; anything else is kept verbatim. Integers order before
/// strings, so sorting by id is numeric for the common case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl NodeId {
    /// Parse a raw export cell (surrounding whitespace is ignored)
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(i) => NodeId::Int(i),
            Err(_) => NodeId::Str(trimmed.to_string()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(i) => write!(f, "{}", i),
            NodeId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId::Int(id)
    }
}

impl From<i32> for NodeId {
    fn from(id: i32) -> Self {
        NodeId::Int(id as i64)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::parse(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::parse(&s)
    }
}

/// Identifier of a relationship in the export
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeId {
    Int(i64),
    Str(String),
}

impl EdgeId {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(i) => EdgeId::Int(i),
            Err(_) => EdgeId::Str(trimmed.to_string()),
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeId::Int(i) => write!(f, "{}", i),
            EdgeId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EdgeId {
    fn from(id: i64) -> Self {
        EdgeId::Int(id)
    }
}

impl From<i32> for EdgeId {
    fn from(id: i32) -> Self {
        EdgeId::Int(id as i64)
    }
}

/// Node label (e.g., "Account", "Taggable")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

/// Edge type (relationship type, e.g., "RESOURCE", "MEMBER_OF")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeType(String);

impl EdgeType {
    pub fn new(edge_type: impl Into<String>) -> Self {
        EdgeType(edge_type.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType(s)
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        EdgeType(s.to_string())
    }
}
