// Generation Interface
//
// The compiler does not build executable plans itself. Statements hand their
// resolved identity to a `ConstantActionFactory` (DDL and utility statements)
// or their bound, optimized tree to a `CodeGenerator` (queries), and wrap
// whatever comes back in an `Action`.

use std::fmt;

use crate::catalog::{IndexDescriptor, SchemaDescriptor, SequenceDescriptor, TableDescriptor};
use crate::common::{CompileError, CompileResult, NodeId, SqlState};
use crate::query::planner::Level2CostEstimate;
use crate::query::statement::ddl::DropBehavior;
use crate::query::statement::transaction::TransactionKind;
use crate::query::statement::ActivationKind;
use crate::query::tree::QueryTree;

/// Executable object produced for a DDL or utility statement
pub trait ConstantAction: fmt::Debug + Send + Sync {
    fn describe(&self) -> String;
}

/// Executable plan produced for a query
pub trait GeneratedPlan: fmt::Debug + Send + Sync {
    /// Runtime support the plan was built against
    fn activation_kind(&self) -> ActivationKind;

    fn describe(&self) -> String;
}

/// Result of the generate phase
#[derive(Debug)]
pub enum Action {
    Constant(Box<dyn ConstantAction>),
    Plan(Box<dyn GeneratedPlan>),
}

impl Action {
    pub fn describe(&self) -> String {
        match self {
            Action::Constant(action) => action.describe(),
            Action::Plan(plan) => plan.describe(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Action::Constant(_))
    }
}

/// Builds constant actions from a statement's resolved identity
pub trait ConstantActionFactory: Send + Sync {
    fn drop_view(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
    ) -> CompileResult<Box<dyn ConstantAction>>;

    fn drop_table(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
        table: &TableDescriptor,
        behavior: DropBehavior,
    ) -> CompileResult<Box<dyn ConstantAction>>;

    fn drop_index(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
        index: &IndexDescriptor,
    ) -> CompileResult<Box<dyn ConstantAction>>;

    fn drop_sequence(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
        sequence: &SequenceDescriptor,
    ) -> CompileResult<Box<dyn ConstantAction>>;

    fn transaction(&self, kind: &TransactionKind) -> CompileResult<Box<dyn ConstantAction>>;
}

/// Everything a generator needs to turn a query into a plan
#[derive(Debug)]
pub struct CursorPlanRequest<'a> {
    pub tree: &'a QueryTree,
    pub root: NodeId,
    /// Runtime support the statement requires
    pub activation: ActivationKind,
    /// Absent when the statement was not optimized
    pub cost: Option<&'a Level2CostEstimate>,
    pub join_order: Option<&'a [usize]>,
}

/// Turns a bound query tree into an executable plan
pub trait CodeGenerator: Send + Sync {
    fn generate_cursor(&self, request: &CursorPlanRequest<'_>) -> CompileResult<Box<dyn GeneratedPlan>>;
}

/// Ask `generator` for a plan and check it supplies the activation the statement needs
pub fn generate_cursor_plan(
    generator: &dyn CodeGenerator,
    request: &CursorPlanRequest<'_>,
) -> CompileResult<Action> {
    let plan = generator.generate_cursor(request)?;
    if plan.activation_kind() < request.activation {
        return Err(CompileError::collaborator(
            SqlState::UnavailableActivationNeed,
            format!(
                "The generator supplied {:?} but the statement needs {:?}",
                plan.activation_kind(),
                request.activation
            ),
        ));
    }
    Ok(Action::Plan(plan))
}
