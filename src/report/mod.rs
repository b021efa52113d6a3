//! Report building
//!
//! Two workbooks come out of a run:
//! - `nodes_by_labels`: one table per primary label, enriched with root and account name
//! - `node_to_root_mapping`: one table of every node that resolved to a different root

pub mod labels;
pub mod mapping;
pub mod names;

pub use labels::{build_label_tables, sanitize_table_name, TableNamer};
pub use mapping::build_mapping_table;
pub use names::{arn_segment, display_name, DisplayNames};

use crate::algo::RootIndex;
use crate::config::ReportConfig;
use crate::expand::ExpandedRow;
use crate::graph::{GraphStore, PropertyValue};
use serde::Serialize;
use tracing::info;

/// Workbook holding the label-partitioned tables
pub const NODES_BY_LABELS: &str = "nodes_by_labels";
/// Workbook (and its single table) holding the node-to-root mapping
pub const NODE_TO_ROOT_MAPPING: &str = "node_to_root_mapping";

/// Identity columns leading every label table
pub const NODE_ID_COLUMN: &str = "node_id";
pub const ROOT_ID_COLUMN: &str = "root_id";
pub const ACCOUNT_NAME_COLUMN: &str = "account_name";

/// A table cell; `Null` is an empty cell
pub type Cell = PropertyValue;

/// Rectangular output table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row
    ///
    /// # Panics
    ///
    /// Panics if the row width differs from the column count.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        assert_eq!(row.len(), self.columns.len(), "row width must match columns");
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Values of one column, top to bottom
    pub fn column(&self, column: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Cell by row position and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}

/// Named group of tables written together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub name: String,
    pub tables: Vec<Table>,
}

impl Workbook {
    pub fn new(name: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            name: name.into(),
            tables,
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(Table::row_count).sum()
    }
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
    pub nodes_by_labels: Workbook,
    pub node_to_root_mapping: Workbook,
}

impl Reports {
    pub fn workbooks(&self) -> [&Workbook; 2] {
        [&self.nodes_by_labels, &self.node_to_root_mapping]
    }

    /// The single mapping table
    pub fn mapping_table(&self) -> Option<&Table> {
        self.node_to_root_mapping.tables.first()
    }
}

/// Builds [`Reports`] from the expanded rows and resolved roots
pub struct ReportBuilder<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, store: &GraphStore, rows: &[ExpandedRow], roots: &RootIndex) -> Reports {
        let names = DisplayNames::from_store(store, self.config);

        let label_tables = build_label_tables(rows, roots, &names, self.config);
        let mapping = build_mapping_table(rows, roots);

        info!(
            "Built {} label tables and a mapping table with {} rows",
            label_tables.len(),
            mapping.row_count()
        );

        Reports {
            nodes_by_labels: Workbook::new(NODES_BY_LABELS, label_tables),
            node_to_root_mapping: Workbook::new(NODE_TO_ROOT_MAPPING, vec![mapping]),
        }
    }
}
