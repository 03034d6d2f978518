// Query Compilation Module
//
// This module contains the statement tree, its traversal framework, and the
// phases that bind, optimize and generate a statement.

pub mod aggregate;
pub mod binder;
pub mod compiler;
pub mod context;
pub mod generate;
pub mod planner;
pub mod statement;
pub mod tree;
pub mod visitor;

// Export key public interfaces
pub use compiler::{Compilation, Compiler, Phase};
pub use context::{ContextFrame, ContextManager};
pub use generate::{Action, CodeGenerator, ConstantAction, ConstantActionFactory, GeneratedPlan};
pub use visitor::{traverse, Visitor};
