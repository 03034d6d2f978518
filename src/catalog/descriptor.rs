// Dictionary Descriptors
//
// Schemas, indexes and sequences as handed out by the data dictionary.

use serde::{Deserialize, Serialize};

use super::schema::TypeDescriptor;

/// Describes a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    id: u32,
    name: String,
    system: bool,
}

impl SchemaDescriptor {
    pub fn new(id: u32, name: &str, system: bool) -> Self {
        SchemaDescriptor { id, name: name.to_uppercase(), system }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_system(&self) -> bool {
        self.system
    }
}

/// Describes an index on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub id: u32,
    pub schema_name: String,
    pub name: String,
    pub table_name: String,
    pub columns: Vec<String>,
}

/// Describes a sequence generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDescriptor {
    pub id: u32,
    pub schema_name: String,
    pub name: String,
    pub data_type: TypeDescriptor,
}
