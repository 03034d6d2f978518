// Query Tree Module
//
// Arena-backed representation of a statement under compilation.

pub mod arena;
pub mod builder;
pub mod node;
pub mod print;
pub mod trigger;
pub mod window;

pub use self::arena::QueryTree;
pub use self::builder::{SelectParts, TreeBuilder};
pub use self::node::{BinaryOperator, Literal, Node, NodeKind, TableName};
pub use self::trigger::TriggerReferencing;
pub use self::window::{WindowDefinition, WindowReference, INLINE_WINDOW_NAME};
