// Common Module
//
// Identifiers, error types and configuration shared by every compiler phase.

pub mod config;
pub mod error;
pub mod types;

pub use self::config::CompilerConfig;
pub use self::error::{CompileError, CompileResult, SqlState};
pub use self::types::{ContextId, NodeId};
