//! Human-readable node names for report columns

use crate::config::ReportConfig;
use crate::graph::{GraphStore, Node, NodeId};
use std::collections::HashMap;

/// Node id -> display name, computed once per run
#[derive(Debug, Clone, Default)]
pub struct DisplayNames {
    names: HashMap<NodeId, String>,
}

impl DisplayNames {
    pub fn from_store(store: &GraphStore, config: &ReportConfig) -> Self {
        let names = store
            .all_nodes()
            .iter()
            .map(|node| (node.id.clone(), display_name(node, config)))
            .collect();
        Self { names }
    }

    /// Display name of a node; ids outside the store get the synthetic name
    pub fn get(&self, id: &NodeId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| synthetic_name(id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Name property, else the last segment of the ARN property, else `Node_<id>`
pub fn display_name(node: &Node, config: &ReportConfig) -> String {
    let text = |key: &str| {
        node.get_property(key)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .filter(|s| !s.is_empty())
    };

    text(config.name_property.as_str())
        .or_else(|| text(config.arn_property.as_str()).and_then(|arn| arn_segment(&arn)))
        .unwrap_or_else(|| synthetic_name(&node.id))
}

/// Last `/`-delimited segment, or last `:`-delimited one when there is no `/`
pub fn arn_segment(arn: &str) -> Option<String> {
    let delimiter = if arn.contains('/') {
        '/'
    } else if arn.contains(':') {
        ':'
    } else {
        return None;
    };
    arn.rsplit(delimiter)
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub fn synthetic_name(id: &NodeId) -> String {
    format!("Node_{}", id)
}
