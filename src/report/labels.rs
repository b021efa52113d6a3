//! Label-partitioned tables

use super::names::DisplayNames;
use super::{Cell, Table, ACCOUNT_NAME_COLUMN, NODE_ID_COLUMN, ROOT_ID_COLUMN};
use crate::algo::RootIndex;
use crate::config::ReportConfig;
use crate::expand::ExpandedRow;
use crate::graph::{Label, PropertyValue};
use indexmap::IndexSet;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Columns that never come from node properties
const RESERVED_COLUMNS: &[&str] = &[
    NODE_ID_COLUMN,
    ROOT_ID_COLUMN,
    ACCOUNT_NAME_COLUMN,
    "primary_label",
    "all_labels",
];

static UNSAFE_TABLE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-. ]").expect("table name pattern is valid"));

/// Strip characters spreadsheets reject and bound the length
pub fn sanitize_table_name(label: &str, config: &ReportConfig) -> String {
    let cleaned: String = UNSAFE_TABLE_CHARS
        .replace_all(label, "")
        .chars()
        .take(config.max_table_name_len)
        .collect();
    if cleaned.is_empty() {
        config.unknown_table_name.clone()
    } else {
        cleaned
    }
}

/// Hands out sanitized table names, suffixing `_2`, `_3`, ... on collisions.
/// Names that differ only in case count as collisions.
pub struct TableNamer<'a> {
    config: &'a ReportConfig,
    /// Lowercased names already handed out
    used: HashSet<String>,
}

impl<'a> TableNamer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            used: HashSet::new(),
        }
    }

    pub fn name_for(&mut self, label: &str) -> String {
        let base = sanitize_table_name(label, self.config);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 2;
        loop {
            let suffix = format!("_{}", n);
            let keep = self
                .config
                .max_table_name_len
                .saturating_sub(suffix.chars().count());
            let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
            if self.used.insert(candidate.to_lowercase()) {
                warn!(
                    "Label '{}' sanitizes to existing table name '{}', using '{}'",
                    label, base, candidate
                );
                return candidate;
            }
            n += 1;
        }
    }
}

/// One table per primary label, ordered by label
pub fn build_label_tables(
    rows: &[ExpandedRow],
    roots: &RootIndex,
    names: &DisplayNames,
    config: &ReportConfig,
) -> Vec<Table> {
    // Property columns in order of first appearance across the export
    let property_columns: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.properties.keys())
        .map(String::as_str)
        .filter(|key| !RESERVED_COLUMNS.contains(key))
        .collect();

    let mut groups: BTreeMap<&Label, Vec<&ExpandedRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(&row.primary_label).or_default().push(row);
    }

    let mut namer = TableNamer::new(config);
    groups
        .into_iter()
        .map(|(label, group)| {
            let name = namer.name_for(label.as_str());
            let table = build_group_table(name, &group, &property_columns, roots, names);
            debug!(
                "Created table '{}' with {} rows and {} columns",
                table.name,
                table.row_count(),
                table.columns.len()
            );
            table
        })
        .collect()
}

fn build_group_table(
    name: String,
    group: &[&ExpandedRow],
    property_columns: &IndexSet<&str>,
    roots: &RootIndex,
    names: &DisplayNames,
) -> Table {
    // Columns with no value anywhere in this group are dropped
    let kept: Vec<&str> = property_columns
        .iter()
        .copied()
        .filter(|column| {
            group
                .iter()
                .any(|row| row.properties.get(*column).is_some_and(|v| !v.is_null()))
        })
        .collect();

    let columns = [NODE_ID_COLUMN, ROOT_ID_COLUMN, ACCOUNT_NAME_COLUMN]
        .into_iter()
        .chain(kept.iter().copied())
        .map(String::from)
        .collect();
    let mut table = Table::new(name, columns);

    for row in group {
        let root = roots.root_of(&row.node_id).unwrap_or(&row.node_id);
        let mut cells: Vec<Cell> = Vec::with_capacity(kept.len() + 3);
        cells.push(PropertyValue::from(&row.node_id));
        cells.push(PropertyValue::from(root));
        cells.push(PropertyValue::String(names.get(root)));
        cells.extend(
            kept.iter()
                .map(|column| row.properties.get(*column).cloned().unwrap_or(Cell::Null)),
        );
        table.push_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::resolve_roots;
    use crate::expand::expand_nodes;
    use crate::graph::{Edge, GraphStore, Node};

    fn sample() -> (GraphStore, ReportConfig) {
        let mut store = GraphStore::new();
        let mut account = Node::new(1, "Account");
        account.set_property("name", "prod");
        store.add_node(account).unwrap();

        let mut bucket = Node::new(2, "S3Bucket");
        bucket.set_property("arn", "arn:aws:s3:::logs");
        bucket.set_property("region", PropertyValue::Null);
        store.add_node(bucket).unwrap();

        let mut role = Node::new_with_labels(3, vec![Label::new("Role"), Label::new("Taggable")]);
        role.set_property("region", "us-east-1");
        role.set_property("root_id", "spoofed");
        store.add_node(role).unwrap();

        store.add_edge(Edge::new(0, 1, 2, "RESOURCE"));
        store.add_edge(Edge::new(1, 1, 3, "RESOURCE"));
        (store, ReportConfig::default())
    }

    fn tables(store: &GraphStore, config: &ReportConfig) -> Vec<Table> {
        let rows = expand_nodes(store, &config.label_separator);
        let roots = resolve_roots(store);
        let names = DisplayNames::from_store(store, config);
        build_label_tables(&rows, &roots, &names, config)
    }

    #[test]
    fn test_tables_ordered_by_label() {
        let (store, config) = sample();
        let names: Vec<String> = tables(&store, &config).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Account", "Role", "S3Bucket", "Taggable"]);
    }

    #[test]
    fn test_identity_columns_and_empty_column_drop() {
        let (store, config) = sample();
        let tables = tables(&store, &config);

        let bucket = &tables[2];
        // `region` is null for every bucket, `name` never appears on one
        assert_eq!(bucket.columns, vec!["node_id", "root_id", "account_name", "arn"]);
        assert_eq!(bucket.cell(0, "root_id"), Some(&Cell::Integer(1)));
        assert_eq!(
            bucket.cell(0, "account_name"),
            Some(&Cell::String("prod".to_string()))
        );

        let account = &tables[0];
        assert_eq!(account.columns, vec!["node_id", "root_id", "account_name", "name"]);
        assert_eq!(account.cell(0, "root_id"), Some(&Cell::Integer(1)));
    }

    #[test]
    fn test_reserved_property_names_do_not_override_identity() {
        let (store, config) = sample();
        let tables = tables(&store, &config);
        let role = &tables[1];
        assert_eq!(role.columns, vec!["node_id", "root_id", "account_name", "region"]);
        assert_eq!(role.cell(0, "root_id"), Some(&Cell::Integer(1)));
        assert_eq!(tables[3].rows, role.rows);
    }

    #[test]
    fn test_sanitize_table_name() {
        let config = ReportConfig::default();
        assert_eq!(sanitize_table_name("AWS:Role/Admin", &config), "AWSRoleAdmin");
        assert_eq!(sanitize_table_name("My Label-1.0", &config), "My Label-1.0");
        assert_eq!(sanitize_table_name("***", &config), "Unknown_Label");
        assert_eq!(
            sanitize_table_name(&"x".repeat(40), &config).chars().count(),
            31
        );
    }

    #[test]
    fn test_colliding_names_get_suffixes() {
        let config = ReportConfig::default();
        let mut namer = TableNamer::new(&config);
        assert_eq!(namer.name_for("A:B"), "AB");
        assert_eq!(namer.name_for("A/B"), "AB_2");
        assert_eq!(namer.name_for("A?B"), "AB_3");

        let long = "y".repeat(31);
        assert_eq!(namer.name_for(&long), long);
        let second = namer.name_for(&format!("{long}!"));
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with("_2"));
    }

    #[test]
    fn test_names_differing_in_case_collide() {
        let config = ReportConfig::default();
        let mut namer = TableNamer::new(&config);
        assert_eq!(namer.name_for("Role"), "Role");
        assert_eq!(namer.name_for("role"), "role_2");
        assert_eq!(namer.name_for("ROLE"), "ROLE_3");
        assert_eq!(namer.name_for("Role_2"), "Role_2_2");
    }
}
