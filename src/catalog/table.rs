//! Table Descriptors
//!
//! This module defines the dictionary's view of tables and views.

use std::collections::HashMap;
use std::fmt;

use super::column::ColumnDescriptor;
use super::schema::TypeDescriptor;
use serde::{Serialize, Deserialize};

/// What kind of relation a table descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    BaseTable,
    View,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::BaseTable => write!(f, "TABLE"),
            TableKind::View => write!(f, "VIEW"),
        }
    }
}

/// Describes a table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table ID (unique within the dictionary)
    id: u32,
    /// Owning schema name
    schema_name: String,
    /// Table name
    name: String,
    kind: TableKind,
    /// Columns in declaration order
    columns: Vec<ColumnDescriptor>,
    /// Column name to index lookup
    column_map: HashMap<String, usize>,
}

impl TableDescriptor {
    /// Create a descriptor from `(name, type)` column pairs
    pub fn new(
        id: u32,
        schema_name: &str,
        name: &str,
        kind: TableKind,
        columns: Vec<(&str, TypeDescriptor)>,
    ) -> Self {
        let columns: Vec<ColumnDescriptor> = columns
            .into_iter()
            .enumerate()
            .map(|(i, (col, ty))| ColumnDescriptor::new(col, i + 1, ty))
            .collect();
        let column_map = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.name().to_string(), i))
            .collect();

        TableDescriptor {
            id,
            schema_name: schema_name.to_uppercase(),
            name: name.to_uppercase(),
            kind,
            columns,
            column_map,
        }
    }

    /// Get the table ID
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn is_view(&self) -> bool {
        self.kind == TableKind::View
    }

    /// Get all columns
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Get a column by (case-insensitive) name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.column_map
            .get(&name.to_uppercase())
            .map(|&idx| &self.columns[idx])
    }

    /// `SCHEMA.NAME`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }
}
