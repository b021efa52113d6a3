//! Parsers for the semi-structured cells of a graph export
//!
//! - `properties`: relaxed `{key: value}` blobs (never fails, degrades to raw text)
//! - `labels`: bracketed label lists (defaults to `Unknown`)

pub mod labels;
pub mod properties;

pub use labels::{parse_labels, ParsedLabels, DEFAULT_LABEL};
pub use properties::{
    format_properties, parse_properties, parse_properties_lossy, try_parse_properties,
    ParsedProperties, PropertyParseError, PropertyParseResult, RAW_PROPERTIES_KEY,
};
