//! Node implementation for the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};

/// A node in the property graph
///
/// Nodes have:
/// - A unique ID
/// - An ordered, non-empty list of labels (export order is kept)
/// - Properties (key-value pairs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Labels in export order
    pub labels: Vec<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,
}

impl Node {
    /// Create a new node with a single label
    pub fn new(id: impl Into<NodeId>, label: impl Into<Label>) -> Self {
        Node {
            id: id.into(),
            labels: vec![label.into()],
            properties: PropertyMap::new(),
        }
    }

    /// Create a new node with multiple labels
    pub fn new_with_labels(id: impl Into<NodeId>, labels: Vec<Label>) -> Self {
        Self::new_with_properties(id, labels, PropertyMap::new())
    }

    /// Create a new node with labels and properties
    pub fn new_with_properties(
        id: impl Into<NodeId>,
        labels: Vec<Label>,
        properties: PropertyMap,
    ) -> Self {
        Node {
            id: id.into(),
            labels,
            properties,
        }
    }

    /// Set a property value
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Labels joined with `separator`, in export order
    pub fn joined_labels(&self, separator: &str) -> String {
        self.labels
            .iter()
            .map(Label::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
