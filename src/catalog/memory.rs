// In-Memory Data Dictionary
//
// A `DataDictionary` backed by hash maps. Object names are stored upper case.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;
use parking_lot::RwLock;

use super::descriptor::{IndexDescriptor, SchemaDescriptor, SequenceDescriptor};
use super::schema::TypeDescriptor;
use super::table::{TableDescriptor, TableKind};
use super::DataDictionary;
use crate::common::CompileResult;

#[derive(Default)]
struct SchemaEntry {
    descriptor: Option<SchemaDescriptor>,
    tables: HashMap<String, TableDescriptor>,
    indexes: HashMap<String, IndexDescriptor>,
    sequences: HashMap<String, SequenceDescriptor>,
}

/// Thread-safe dictionary kept entirely in memory
pub struct InMemoryDictionary {
    schemas: RwLock<HashMap<String, SchemaEntry>>,
    /// Counter for assigning unique object IDs
    id_counter: AtomicU32,
}

impl Default for InMemoryDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDictionary {
    /// Create a dictionary holding the `APP` user schema and the `SYS` system schema
    pub fn new() -> Self {
        let dictionary = InMemoryDictionary {
            schemas: RwLock::new(HashMap::new()),
            id_counter: AtomicU32::new(1),
        };
        dictionary.insert_schema("APP", false);
        dictionary.insert_schema("SYS", true);
        dictionary
    }

    fn next_id(&self) -> u32 {
        self.id_counter.fetch_add(1, Ordering::SeqCst)
    }

    fn insert_schema(&self, name: &str, system: bool) -> SchemaDescriptor {
        let key = name.to_uppercase();
        let mut schemas = self.schemas.write();
        if let Some(existing) = schemas.get(&key).and_then(|e| e.descriptor.clone()) {
            return existing;
        }
        let descriptor = SchemaDescriptor::new(self.next_id(), &key, system);
        schemas.entry(key).or_default().descriptor = Some(descriptor.clone());
        descriptor
    }

    /// Create a user schema, or return the existing one
    pub fn create_schema(&self, name: &str) -> SchemaDescriptor {
        self.insert_schema(name, false)
    }

    fn insert_table(
        &self,
        schema: &str,
        name: &str,
        kind: TableKind,
        columns: Vec<(&str, TypeDescriptor)>,
    ) -> TableDescriptor {
        let schema_key = schema.to_uppercase();
        self.insert_schema(&schema_key, false);
        let table = TableDescriptor::new(self.next_id(), &schema_key, name, kind, columns);
        debug!("Registering {} {}", kind, table.qualified_name());

        let mut schemas = self.schemas.write();
        let entry = schemas.entry(schema_key).or_default();
        entry.tables.insert(table.name().to_string(), table.clone());
        table
    }

    /// Register a base table
    pub fn create_table(
        &self,
        schema: &str,
        name: &str,
        columns: Vec<(&str, TypeDescriptor)>,
    ) -> TableDescriptor {
        self.insert_table(schema, name, TableKind::BaseTable, columns)
    }

    /// Register a view; its columns are the view's result columns
    pub fn create_view(
        &self,
        schema: &str,
        name: &str,
        columns: Vec<(&str, TypeDescriptor)>,
    ) -> TableDescriptor {
        self.insert_table(schema, name, TableKind::View, columns)
    }

    /// Register an index on an existing table
    pub fn create_index(
        &self,
        schema: &str,
        name: &str,
        table: &str,
        columns: &[&str],
    ) -> IndexDescriptor {
        let schema_key = schema.to_uppercase();
        self.insert_schema(&schema_key, false);
        let index = IndexDescriptor {
            id: self.next_id(),
            schema_name: schema_key.clone(),
            name: name.to_uppercase(),
            table_name: table.to_uppercase(),
            columns: columns.iter().map(|c| c.to_uppercase()).collect(),
        };
        let mut schemas = self.schemas.write();
        schemas
            .entry(schema_key)
            .or_default()
            .indexes
            .insert(index.name.clone(), index.clone());
        index
    }

    /// Register a sequence
    pub fn create_sequence(
        &self,
        schema: &str,
        name: &str,
        data_type: TypeDescriptor,
    ) -> SequenceDescriptor {
        let schema_key = schema.to_uppercase();
        self.insert_schema(&schema_key, false);
        let sequence = SequenceDescriptor {
            id: self.next_id(),
            schema_name: schema_key.clone(),
            name: name.to_uppercase(),
            data_type,
        };
        let mut schemas = self.schemas.write();
        schemas
            .entry(schema_key)
            .or_default()
            .sequences
            .insert(sequence.name.clone(), sequence.clone());
        sequence
    }
}

impl DataDictionary for InMemoryDictionary {
    fn schema(&self, name: &str) -> CompileResult<Option<SchemaDescriptor>> {
        let schemas = self.schemas.read();
        Ok(schemas
            .get(&name.to_uppercase())
            .and_then(|entry| entry.descriptor.clone()))
    }

    fn table(&self, schema: &SchemaDescriptor, name: &str) -> CompileResult<Option<TableDescriptor>> {
        let schemas = self.schemas.read();
        Ok(schemas
            .get(schema.name())
            .and_then(|entry| entry.tables.get(&name.to_uppercase()).cloned()))
    }

    fn index(&self, schema: &SchemaDescriptor, name: &str) -> CompileResult<Option<IndexDescriptor>> {
        let schemas = self.schemas.read();
        Ok(schemas
            .get(schema.name())
            .and_then(|entry| entry.indexes.get(&name.to_uppercase()).cloned()))
    }

    fn sequence(
        &self,
        schema: &SchemaDescriptor,
        name: &str,
    ) -> CompileResult<Option<SequenceDescriptor>> {
        let schemas = self.schemas.read();
        Ok(schemas
            .get(schema.name())
            .and_then(|entry| entry.sequences.get(&name.to_uppercase()).cloned()))
    }
}
