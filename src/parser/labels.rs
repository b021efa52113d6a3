//! Label list parsing
//!
//! Exports render a node's labels as a bracketed list, e.g. `[Account, Taggable]` or
//! `['Account', 'Taggable']`.

use crate::graph::Label;

/// Label given to nodes whose label field is missing or empty
pub const DEFAULT_LABEL: &str = "Unknown";

/// Outcome of parsing one label field
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLabels {
    /// Non-empty, in export order
    pub labels: Vec<Label>,
    /// True when the default label was substituted
    pub defaulted: bool,
}

/// Split a label field into trimmed labels, substituting [`DEFAULT_LABEL`] when
/// nothing usable remains
pub fn parse_labels(raw: Option<&str>) -> ParsedLabels {
    let labels: Vec<Label> = raw
        .map(|raw| {
            raw.trim()
                .trim_matches(|c: char| c == '[' || c == ']')
                .split(',')
                .map(|token| token.trim().trim_matches(|c: char| c == '\'' || c == '"').trim())
                .filter(|token| !token.is_empty())
                .map(Label::new)
                .collect()
        })
        .unwrap_or_default();

    if labels.is_empty() {
        ParsedLabels {
            labels: vec![Label::new(DEFAULT_LABEL)],
            defaulted: true,
        }
    } else {
        ParsedLabels {
            labels,
            defaulted: false,
        }
    }
}
