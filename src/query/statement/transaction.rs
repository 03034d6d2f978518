// Transaction Control Statements
//
// COMMIT, ROLLBACK and SET ISOLATION. These must be able to end the current
// transaction, so they never run as atomic statements and never get an
// implicit savepoint (the commit or rollback would destroy it).

use std::fmt;

use log::debug;

use crate::common::{CompileResult, ContextId};
use crate::query::context::ContextFrame;
use crate::query::generate::Action;
use crate::query::statement::{ActivationKind, BindContext, GenerateContext, StatementNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Commit,
    Rollback,
    SetIsolation(IsolationLevel),
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Commit => write!(f, "COMMIT"),
            TransactionKind::Rollback => write!(f, "ROLLBACK"),
            TransactionKind::SetIsolation(level) => write!(f, "SET ISOLATION {}", level),
        }
    }
}

#[derive(Debug)]
pub struct TransactionStatement {
    context: ContextId,
    kind: TransactionKind,
}

impl TransactionStatement {
    pub fn new(frame: &ContextFrame, kind: TransactionKind) -> Self {
        TransactionStatement { context: frame.id(), kind }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }
}

impl StatementNode for TransactionStatement {
    fn statement_name(&self) -> &'static str {
        match self.kind {
            TransactionKind::Commit => "COMMIT",
            TransactionKind::Rollback => "ROLLBACK",
            TransactionKind::SetIsolation(_) => "SET ISOLATION",
        }
    }

    fn context(&self) -> ContextId {
        self.context
    }

    fn bind(&mut self, _ctx: &BindContext<'_>) -> CompileResult<()> {
        debug!("Nothing to bind for {}", self.kind);
        Ok(())
    }

    fn generate(&self, ctx: &GenerateContext<'_>) -> CompileResult<Action> {
        Ok(Action::Constant(ctx.actions.transaction(&self.kind)?))
    }

    fn activation_kind(&self) -> ActivationKind {
        ActivationKind::NeedsNothing
    }

    fn needs_savepoint(&self) -> bool {
        false
    }

    fn is_atomic(&self) -> bool {
        false
    }

    fn tree_print(&self) -> String {
        self.kind.to_string()
    }
}
