// DROP Statements
//
// DROP VIEW / TABLE / INDEX / SEQUENCE. Bind resolves the owning schema and
// the target object; only then can the statement ask the constant-action
// factory for the action that performs the drop.

use std::fmt;

use log::debug;

use crate::catalog::{IndexDescriptor, SchemaDescriptor, SequenceDescriptor, TableDescriptor};
use crate::common::{CompileError, CompileResult, ContextId, SqlState};
use crate::query::context::ContextFrame;
use crate::query::generate::{Action, ConstantAction, ConstantActionFactory};
use crate::query::statement::{ActivationKind, BindContext, GenerateContext, StatementNode};
use crate::query::tree::TableName;

/// CASCADE or RESTRICT on DROP TABLE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropBehavior {
    Cascade,
    #[default]
    Restrict,
}

impl fmt::Display for DropBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropBehavior::Cascade => write!(f, "CASCADE"),
            DropBehavior::Restrict => write!(f, "RESTRICT"),
        }
    }
}

/// What kind of object is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    View,
    Table(DropBehavior),
    Index,
    Sequence,
}

/// Object found by bind
#[derive(Debug, Clone)]
enum DroppedObject {
    View(TableDescriptor),
    Table(TableDescriptor),
    Index(IndexDescriptor),
    Sequence(SequenceDescriptor),
}

#[derive(Debug, Clone)]
struct Resolved {
    schema: SchemaDescriptor,
    object: DroppedObject,
}

#[derive(Debug)]
pub struct DropStatement {
    context: ContextId,
    target: DropTarget,
    name: TableName,
    resolved: Option<Resolved>,
}

impl DropStatement {
    pub fn new(frame: &ContextFrame, target: DropTarget, name: TableName) -> Self {
        DropStatement { context: frame.id(), target, name, resolved: None }
    }

    pub fn target(&self) -> DropTarget {
        self.target
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn is_bound(&self) -> bool {
        self.resolved.is_some()
    }

    /// Unqualified object name
    pub fn relative_name(&self) -> &str {
        &self.name.name
    }

    /// `SCHEMA.NAME`, available once the schema is resolved
    pub fn full_name(&self) -> Option<String> {
        self.resolved
            .as_ref()
            .map(|r| format!("{}.{}", r.schema.name(), self.name.name))
    }

    /// Owning schema, available once bound
    pub fn schema_descriptor(&self) -> Option<&SchemaDescriptor> {
        self.resolved.as_ref().map(|r| &r.schema)
    }

    fn object_missing(&self, schema: &SchemaDescriptor) -> CompileError {
        CompileError::resolution(
            SqlState::ObjectDoesNotExist,
            format!(
                "'{}' cannot be performed on '{}.{}' because it does not exist",
                self.statement_name(),
                schema.name(),
                self.name.name
            ),
        )
    }

    fn resolve_object(
        &self,
        ctx: &BindContext<'_>,
        schema: &SchemaDescriptor,
    ) -> CompileResult<DroppedObject> {
        let name = &self.name.name;
        match self.target {
            DropTarget::View => {
                let table = ctx
                    .dictionary
                    .table(schema, name)?
                    .ok_or_else(|| self.object_missing(schema))?;
                if !table.is_view() {
                    return Err(CompileError::resolution(
                        SqlState::DropViewOnNonView,
                        format!(
                            "'{}' is not a view. If it is a table, then use DROP TABLE instead",
                            table.qualified_name()
                        ),
                    ));
                }
                Ok(DroppedObject::View(table))
            }
            DropTarget::Table(_) => {
                let table = ctx
                    .dictionary
                    .table(schema, name)?
                    .ok_or_else(|| self.object_missing(schema))?;
                if table.is_view() {
                    return Err(CompileError::resolution(
                        SqlState::InvalidOperationOnView,
                        format!(
                            "'DROP TABLE' is not allowed on '{}' because it is a view",
                            table.qualified_name()
                        ),
                    ));
                }
                Ok(DroppedObject::Table(table))
            }
            DropTarget::Index => ctx
                .dictionary
                .index(schema, name)?
                .map(DroppedObject::Index)
                .ok_or_else(|| self.object_missing(schema)),
            DropTarget::Sequence => ctx
                .dictionary
                .sequence(schema, name)?
                .map(DroppedObject::Sequence)
                .ok_or_else(|| self.object_missing(schema)),
        }
    }

    /// Ask the factory for the action that performs this drop.
    ///
    /// Fails with a structural error when the statement has not been bound.
    pub fn make_constant_action(
        &self,
        factory: &dyn ConstantActionFactory,
    ) -> CompileResult<Box<dyn ConstantAction>> {
        let resolved = self.resolved.as_ref().ok_or_else(|| {
            CompileError::internal(format!(
                "{} {} asked for its constant action before bind resolved its schema",
                self.statement_name(),
                self.name
            ))
        })?;
        let full_name = format!("{}.{}", resolved.schema.name(), self.name.name);
        let relative_name = self.relative_name();
        let schema = &resolved.schema;

        match (&resolved.object, self.target) {
            (DroppedObject::View(_), _) => factory.drop_view(&full_name, relative_name, schema),
            (DroppedObject::Table(table), DropTarget::Table(behavior)) => {
                factory.drop_table(&full_name, relative_name, schema, table, behavior)
            }
            (DroppedObject::Table(table), _) => {
                factory.drop_table(&full_name, relative_name, schema, table, DropBehavior::default())
            }
            (DroppedObject::Index(index), _) => {
                factory.drop_index(&full_name, relative_name, schema, index)
            }
            (DroppedObject::Sequence(sequence), _) => {
                factory.drop_sequence(&full_name, relative_name, schema, sequence)
            }
        }
    }
}

impl StatementNode for DropStatement {
    fn statement_name(&self) -> &'static str {
        match self.target {
            DropTarget::View => "DROP VIEW",
            DropTarget::Table(_) => "DROP TABLE",
            DropTarget::Index => "DROP INDEX",
            DropTarget::Sequence => "DROP SEQUENCE",
        }
    }

    fn context(&self) -> ContextId {
        self.context
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> CompileResult<()> {
        self.resolved = None;
        let schema_name = match &self.name.schema {
            Some(schema) => schema.clone(),
            None => ctx.frame.default_schema().to_string(),
        };
        let schema = ctx.dictionary.schema(&schema_name)?.ok_or_else(|| {
            CompileError::resolution(
                SqlState::SchemaDoesNotExist,
                format!("Schema '{}' does not exist", schema_name),
            )
        })?;
        if schema.is_system() {
            return Err(CompileError::resolution(
                SqlState::NoDdlInSystemSchema,
                format!(
                    "'{}' is not allowed in the '{}' schema",
                    self.statement_name(),
                    schema.name()
                ),
            ));
        }

        let object = self.resolve_object(ctx, &schema)?;
        debug!("Bound {} {}.{}", self.statement_name(), schema.name(), self.name.name);
        self.resolved = Some(Resolved { schema, object });
        Ok(())
    }

    fn generate(&self, ctx: &GenerateContext<'_>) -> CompileResult<Action> {
        Ok(Action::Constant(self.make_constant_action(ctx.actions)?))
    }

    fn activation_kind(&self) -> ActivationKind {
        ActivationKind::NeedsNothing
    }

    fn tree_print(&self) -> String {
        match self.target {
            DropTarget::Table(behavior) => {
                format!("{} {} {}", self.statement_name(), self.name, behavior)
            }
            _ => format!("{} {}", self.statement_name(), self.name),
        }
    }
}
