//! Statement Variant Set
//!
//! Every compilable statement is one variant of `Statement`, and every
//! variant implements `StatementNode`: the bind / optimize / generate
//! lifecycle plus the fixed execution flags (activation kind, atomicity,
//! savepoint requirement). Kind-specific data lives in the variant payload.

pub mod cursor;
pub mod ddl;
pub mod nop;
pub mod transaction;

pub use self::cursor::CursorStatement;
pub use self::ddl::{DropBehavior, DropStatement, DropTarget};
pub use self::nop::NoOpStatement;
pub use self::transaction::{IsolationLevel, TransactionKind, TransactionStatement};

use crate::catalog::DataDictionary;
use crate::common::{CompileResult, CompilerConfig, ContextId};
use crate::query::aggregate::AggregateRegistry;
use crate::query::context::ContextFrame;
use crate::query::generate::{Action, CodeGenerator, ConstantActionFactory};
use crate::query::planner::StatisticsProvider;

/// Runtime support a generated plan requires, in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivationKind {
    NeedsNothing,
    NeedsRowActivation,
    NeedsFullActivation,
}

/// Collaborators available during bind
pub struct BindContext<'a> {
    pub frame: &'a ContextFrame,
    pub dictionary: &'a dyn DataDictionary,
    pub aggregates: &'a AggregateRegistry,
    pub config: &'a CompilerConfig,
}

/// Collaborators available during optimize
pub struct OptimizeContext<'a> {
    pub statistics: &'a dyn StatisticsProvider,
    pub config: &'a CompilerConfig,
}

/// Collaborators available during generate
pub struct GenerateContext<'a> {
    pub actions: &'a dyn ConstantActionFactory,
    pub generator: &'a dyn CodeGenerator,
}

/// Lifecycle shared by all statement kinds
pub trait StatementNode {
    /// Name used in diagnostics, e.g. `DROP VIEW`
    fn statement_name(&self) -> &'static str;

    /// Compilation context the statement was created under
    fn context(&self) -> ContextId;

    /// Resolve names and types in place
    fn bind(&mut self, ctx: &BindContext<'_>) -> CompileResult<()>;

    fn optimize(&mut self, _ctx: &OptimizeContext<'_>) -> CompileResult<()> {
        Ok(())
    }

    /// Produce the executable action. Only valid after a successful bind.
    fn generate(&self, ctx: &GenerateContext<'_>) -> CompileResult<Action>;

    fn activation_kind(&self) -> ActivationKind;

    /// Whether execution is wrapped in an implicit savepoint
    fn needs_savepoint(&self) -> bool {
        true
    }

    /// Whether the statement may run inside an atomic context
    fn is_atomic(&self) -> bool {
        true
    }

    /// Estimated result rows, zero when nothing was estimated
    fn row_estimate(&self) -> i64 {
        0
    }

    fn tree_print(&self) -> String {
        self.statement_name().to_string()
    }
}

/// A top-level compilable statement
#[derive(Debug)]
pub enum Statement {
    Cursor(CursorStatement),
    Drop(DropStatement),
    Transaction(TransactionStatement),
    NoOp(NoOpStatement),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Statement::Cursor($s) => $body,
            Statement::Drop($s) => $body,
            Statement::Transaction($s) => $body,
            Statement::NoOp($s) => $body,
        }
    };
}

impl StatementNode for Statement {
    fn statement_name(&self) -> &'static str {
        dispatch!(self, s => s.statement_name())
    }

    fn context(&self) -> ContextId {
        dispatch!(self, s => s.context())
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> CompileResult<()> {
        dispatch!(self, s => s.bind(ctx))
    }

    fn optimize(&mut self, ctx: &OptimizeContext<'_>) -> CompileResult<()> {
        dispatch!(self, s => s.optimize(ctx))
    }

    fn generate(&self, ctx: &GenerateContext<'_>) -> CompileResult<Action> {
        dispatch!(self, s => s.generate(ctx))
    }

    fn activation_kind(&self) -> ActivationKind {
        dispatch!(self, s => s.activation_kind())
    }

    fn needs_savepoint(&self) -> bool {
        dispatch!(self, s => s.needs_savepoint())
    }

    fn is_atomic(&self) -> bool {
        dispatch!(self, s => s.is_atomic())
    }

    fn row_estimate(&self) -> i64 {
        dispatch!(self, s => s.row_estimate())
    }

    fn tree_print(&self) -> String {
        dispatch!(self, s => s.tree_print())
    }
}

impl From<CursorStatement> for Statement {
    fn from(s: CursorStatement) -> Self {
        Statement::Cursor(s)
    }
}

impl From<DropStatement> for Statement {
    fn from(s: DropStatement) -> Self {
        Statement::Drop(s)
    }
}

impl From<TransactionStatement> for Statement {
    fn from(s: TransactionStatement) -> Self {
        Statement::Transaction(s)
    }
}

impl From<NoOpStatement> for Statement {
    fn from(s: NoOpStatement) -> Self {
        Statement::NoOp(s)
    }
}
