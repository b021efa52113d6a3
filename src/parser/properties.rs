//! Relaxed property blob parser using Pest
//!
//! Exports render properties as `{key: value, ...}` with unquoted keys and scalars.
//! Parsing never fails from the caller's point of view: a blob the grammar rejects
//! becomes `{"raw_properties": Raw(<blob>)}`.

use crate::graph::{PropertyMap, PropertyValue};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;
use tracing::debug;

#[derive(Parser)]
#[grammar = "parser/properties.pest"]
struct PropertyBlobParser;

/// Key used for the passthrough entry of a blob that failed to parse
pub const RAW_PROPERTIES_KEY: &str = "raw_properties";

/// Parser errors
#[derive(Error, Debug)]
pub enum PropertyParseError {
    /// Pest parsing error
    #[error("Parse error: {0}")]
    PestError(#[from] Box<pest::error::Error<Rule>>),
}

pub type PropertyParseResult<T> = Result<T, PropertyParseError>;

/// Outcome of parsing one blob
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProperties {
    pub properties: PropertyMap,
    /// True when the blob was malformed and kept as raw text
    pub degraded: bool,
}

/// Parse a blob, degrading to a raw passthrough on any error
pub fn parse_properties(blob: &str) -> PropertyMap {
    parse_properties_lossy(Some(blob)).properties
}

/// Parse an optional blob; a missing, blank or `{}` blob is an empty map
pub fn parse_properties_lossy(blob: Option<&str>) -> ParsedProperties {
    let Some(blob) = blob else {
        return ParsedProperties {
            properties: PropertyMap::new(),
            degraded: false,
        };
    };

    match try_parse_properties(blob) {
        Ok(properties) => ParsedProperties {
            properties,
            degraded: false,
        },
        Err(e) => {
            debug!("Keeping malformed property blob as raw text: {}", e);
            let mut properties = PropertyMap::new();
            properties.insert(
                RAW_PROPERTIES_KEY.to_string(),
                PropertyValue::Raw(blob.to_string()),
            );
            ParsedProperties {
                properties,
                degraded: true,
            }
        }
    }
}

/// Parse a blob strictly
pub fn try_parse_properties(blob: &str) -> PropertyParseResult<PropertyMap> {
    let trimmed = blob.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return Ok(PropertyMap::new());
    }

    let mut properties = PropertyMap::new();
    let pairs = PropertyBlobParser::parse(Rule::properties, trimmed).map_err(Box::new)?;

    for pair in pairs.flatten().filter(|p| p.as_rule() == Rule::pair) {
        let mut inner = pair.into_inner();
        let key = match inner.next() {
            Some(key) => parse_key(key),
            None => continue,
        };
        let value = inner.next().map_or(PropertyValue::Null, parse_value);
        // Later duplicates win, keeping the first position
        properties.insert(key, value);
    }

    Ok(properties)
}

fn parse_key(pair: Pair<Rule>) -> String {
    match pair.into_inner().next() {
        Some(inner) => match inner.as_rule() {
            Rule::double_quoted | Rule::single_quoted => unquote(inner.as_str()),
            _ => inner.as_str().to_string(),
        },
        None => String::new(),
    }
}

fn parse_value(pair: Pair<Rule>) -> PropertyValue {
    let Some(inner) = pair.into_inner().next() else {
        return PropertyValue::Null;
    };
    match inner.as_rule() {
        Rule::double_quoted | Rule::single_quoted => {
            PropertyValue::String(unquote(inner.as_str()))
        }
        Rule::nested => PropertyValue::Raw(inner.as_str().to_string()),
        _ => type_scalar(inner.as_str()),
    }
}

/// Type an unquoted scalar token
fn type_scalar(token: &str) -> PropertyValue {
    let token = token.trim();
    match token {
        "" | "null" => PropertyValue::Null,
        "true" => PropertyValue::Boolean(true),
        "false" => PropertyValue::Boolean(false),
        _ => {
            if let Ok(i) = token.parse::<i64>() {
                PropertyValue::Integer(i)
            } else if let Some(f) = parse_finite_float(token) {
                PropertyValue::Float(f)
            } else {
                PropertyValue::String(token.to_string())
            }
        }
    }
}

fn parse_finite_float(token: &str) -> Option<f64> {
    // Rust also accepts "inf"/"NaN"; those stay strings
    if !token.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return None;
    }
    token.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Strip surrounding quotes and resolve backslash escapes
fn unquote(quoted: &str) -> String {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Render a property map in the relaxed blob syntax.
///
/// Strings are double-quoted so they read back as strings; every other scalar is
/// written bare. Raw values are written verbatim.
pub fn format_properties(properties: &PropertyMap) -> String {
    let body: Vec<String> = properties
        .iter()
        .map(|(key, value)| format!("{}: {}", format_key(key), format_value(value)))
        .collect();
    format!("{{{}}}", body.join(", "))
}

fn format_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if bare {
        key.to_string()
    } else {
        quote(key)
    }
}

fn format_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => quote(s),
        PropertyValue::Integer(i) => i.to_string(),
        // Debug keeps a fractional part so the value reads back as a float
        PropertyValue::Float(f) => format!("{:?}", f),
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Null => "null".to_string(),
        PropertyValue::Raw(s) => s.clone(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
