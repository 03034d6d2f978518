//! Catalog Interface Module
//!
//! The compiler never owns persistent metadata. It resolves names through a
//! `DataDictionary` supplied by the session; `memory::InMemoryDictionary` is a
//! self-contained implementation used by tests and benchmarks.

pub mod column;
pub mod descriptor;
pub mod memory;
pub mod schema;
pub mod table;

// Re-export key types
pub use self::column::ColumnDescriptor;
pub use self::descriptor::{IndexDescriptor, SchemaDescriptor, SequenceDescriptor};
pub use self::memory::InMemoryDictionary;
pub use self::schema::{TypeDescriptor, TypeId};
pub use self::table::{TableDescriptor, TableKind};

use crate::common::CompileResult;

/// Name resolution collaborator.
///
/// Lookups are synchronous and fallible. `Ok(None)` means the object does not
/// exist; `Err` means the dictionary itself failed. The compiler does not retry.
pub trait DataDictionary: Send + Sync {
    /// Look up a schema by name
    fn schema(&self, name: &str) -> CompileResult<Option<SchemaDescriptor>>;

    /// Look up a table or view in a schema
    fn table(&self, schema: &SchemaDescriptor, name: &str) -> CompileResult<Option<TableDescriptor>>;

    /// Look up an index in a schema
    fn index(&self, schema: &SchemaDescriptor, name: &str) -> CompileResult<Option<IndexDescriptor>>;

    /// Look up a sequence in a schema
    fn sequence(
        &self,
        schema: &SchemaDescriptor,
        name: &str,
    ) -> CompileResult<Option<SequenceDescriptor>>;
}
