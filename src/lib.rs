// sqlforge: SQL Compiler Core
//
// Query trees, the visitor engine, the bind / optimize / generate lifecycle of
// statements, cost estimates and aggregate resolution.

pub mod catalog;
pub mod common;
pub mod query;

// Re-export key items for convenient access
pub use catalog::{DataDictionary, InMemoryDictionary};
pub use common::{CompileError, CompileResult, CompilerConfig, SqlState};
pub use query::compiler::{CompiledStatement, Compiler};
pub use query::context::{ContextFrame, ContextManager};
pub use query::statement::{ActivationKind, Statement, StatementNode};
pub use query::tree::QueryTree;
