// Column Descriptors
//
// This module defines the column metadata the binder resolves column
// references against.

use super::schema::TypeDescriptor;
use serde::{Serialize, Deserialize};

/// A column of a table or view, as described by the dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name (stored upper case)
    name: String,
    /// 1-based position within the table
    position: usize,
    /// Declared type
    type_desc: TypeDescriptor,
}

impl ColumnDescriptor {
    pub fn new(name: &str, position: usize, type_desc: TypeDescriptor) -> Self {
        ColumnDescriptor {
            name: name.to_uppercase(),
            position,
            type_desc,
        }
    }

    /// Get the column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the 1-based column position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the declared type
    pub fn type_desc(&self) -> &TypeDescriptor {
        &self.type_desc
    }
}
