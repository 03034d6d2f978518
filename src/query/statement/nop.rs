// No-Op Statements
//
// Statements whose whole effect happens while parsing (debug toggles and the
// like). Their bind always fails with the parse-only state, which is what
// keeps them from ever reaching code generation.

use crate::common::{CompileError, CompileResult, ContextId, SqlState};
use crate::query::context::ContextFrame;
use crate::query::generate::Action;
use crate::query::statement::{ActivationKind, BindContext, GenerateContext, StatementNode};

#[derive(Debug)]
pub struct NoOpStatement {
    context: ContextId,
    description: String,
}

impl NoOpStatement {
    pub fn new(frame: &ContextFrame, description: &str) -> Self {
        NoOpStatement { context: frame.id(), description: description.to_string() }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl StatementNode for NoOpStatement {
    fn statement_name(&self) -> &'static str {
        "NO-OP"
    }

    fn context(&self) -> ContextId {
        self.context
    }

    fn bind(&mut self, _ctx: &BindContext<'_>) -> CompileResult<()> {
        Err(CompileError::ParseOnly { statement: self.description.clone() })
    }

    fn generate(&self, _ctx: &GenerateContext<'_>) -> CompileResult<Action> {
        Err(CompileError::structural(
            SqlState::UnableToGenerate,
            format!("{} cannot generate code", self.statement_name()),
        ))
    }

    fn activation_kind(&self) -> ActivationKind {
        ActivationKind::NeedsNothing
    }

    fn tree_print(&self) -> String {
        format!("{}: {}", self.statement_name(), self.description)
    }
}
