// SELECT Binding
//
// Resolves the tables of a SELECT against the data dictionary, binds column
// references to FROM positions, assigns result types to expressions,
// resolves aggregates and window references, and checks grouping.

use log::debug;

use crate::catalog::{TableDescriptor, TypeDescriptor, TypeId};
use crate::common::{CompileError, CompileResult, NodeId, SqlState};
use crate::query::aggregate::AggregateRegistry;
use crate::query::statement::BindContext;
use crate::query::tree::node::{
    ColumnSource, Literal, SELECT_FROM_LIST, SELECT_GROUP_BY, SELECT_RESULT_COLUMNS, SELECT_WHERE,
    SELECT_WINDOWS, WINDOW_ORDER, WINDOW_PARTITION,
};
use crate::query::tree::{BinaryOperator, NodeKind, QueryTree};
use crate::query::visitor::{traverse, CollectNodesVisitor, HasNodeVisitor, ReplaceNodeVisitor};

/// Ranking functions usable with an OVER clause
const WINDOW_FUNCTIONS: &[&str] = &["ROW_NUMBER", "RANK", "DENSE_RANK"];

#[derive(Debug)]
struct FromEntry {
    exposed_name: String,
    descriptor: TableDescriptor,
}

/// Bind the SELECT rooted at `select` in place
pub fn bind_select(tree: &mut QueryTree, select: NodeId, ctx: &BindContext<'_>) -> CompileResult<()> {
    let scope = bind_from_list(tree, select, ctx)?;
    let binder = ExpressionBinder { scope: &scope, aggregates: ctx.aggregates };

    let where_list = tree.child(select, SELECT_WHERE)?;
    let mut has_aggregate = HasNodeVisitor::new(|k| matches!(k, NodeKind::Aggregate(_)));
    traverse(tree, where_list, &mut has_aggregate)?;
    if has_aggregate.has_node() {
        return Err(CompileError::resolution(
            SqlState::NoAggregatesInWhereClause,
            "Aggregates are not allowed in the WHERE clause",
        ));
    }
    for conjunct in tree.children(where_list)?.to_vec() {
        binder.bind(tree, conjunct)?;
        let conjunct_type = tree.type_of(conjunct)?.map(|t| t.type_id());
        match conjunct_type {
            Some(TypeId::Boolean) => {}
            None => tree
                .node_mut(conjunct)?
                .set_type_desc(TypeDescriptor::new(TypeId::Boolean, true)),
            Some(other) => {
                return Err(CompileError::resolution(
                    SqlState::NonBooleanWhereClause,
                    format!("The WHERE clause has type '{}'; it must evaluate to BOOLEAN", other),
                ))
            }
        }
    }

    let result_columns = tree.child(select, SELECT_RESULT_COLUMNS)?;
    for column in tree.children(result_columns)?.to_vec() {
        let expr = tree.child(column, 0)?;
        binder.bind(tree, expr)?;
        let ty = tree.type_of(expr)?.cloned().unwrap_or_else(untyped_parameter);
        tree.node_mut(expr)?.set_type_desc(ty.clone());
        tree.node_mut(column)?.set_type_desc(ty);
    }

    let group_by = tree.child(select, SELECT_GROUP_BY)?;
    for expr in tree.children(group_by)?.to_vec() {
        binder.bind(tree, expr)?;
    }

    bind_windows(tree, select, &binder)?;
    check_grouping(tree, select)?;

    debug!("Bound SELECT with {} table(s) in the FROM list", scope.len());
    Ok(())
}

/// Type given to a `?` that nothing else constrains
fn untyped_parameter() -> TypeDescriptor {
    TypeDescriptor::new(TypeId::Varchar, true)
}

fn bind_from_list(
    tree: &mut QueryTree,
    select: NodeId,
    ctx: &BindContext<'_>,
) -> CompileResult<Vec<FromEntry>> {
    let from_list = tree.child(select, SELECT_FROM_LIST)?;
    let mut scope: Vec<FromEntry> = Vec::new();

    for (number, table) in tree.children(from_list)?.to_vec().into_iter().enumerate() {
        let NodeKind::FromBaseTable(from) = tree.kind(table)? else {
            return Err(CompileError::internal(format!(
                "FROM list entry {} is a {}",
                table,
                tree.kind(table)?.node_name()
            )));
        };
        let schema_name = match &from.table_name.schema {
            Some(schema) => schema.clone(),
            None => ctx.frame.default_schema().to_string(),
        };
        let schema = ctx.dictionary.schema(&schema_name)?.ok_or_else(|| {
            CompileError::resolution(
                SqlState::SchemaDoesNotExist,
                format!("Schema '{}' does not exist", schema_name),
            )
        })?;
        let descriptor = ctx.dictionary.table(&schema, &from.table_name.name)?.ok_or_else(|| {
            CompileError::resolution(
                SqlState::TableNotFound,
                format!("Table/View '{}.{}' does not exist", schema_name, from.table_name.name),
            )
        })?;

        let exposed_name = from.exposed_name().to_string();
        if scope.iter().any(|e| e.exposed_name == exposed_name) {
            return Err(CompileError::resolution(
                SqlState::DuplicateTableName,
                format!(
                    "The table or alias name '{}' is used more than once in the FROM list",
                    exposed_name
                ),
            ));
        }

        if let NodeKind::FromBaseTable(from) = tree.kind_mut(table)? {
            from.descriptor = Some(descriptor.clone());
            from.table_number = Some(number);
        }
        scope.push(FromEntry { exposed_name, descriptor });
    }
    Ok(scope)
}

struct ExpressionBinder<'a> {
    scope: &'a [FromEntry],
    aggregates: &'a AggregateRegistry,
}

impl ExpressionBinder<'_> {
    /// Bind an expression subtree, children before parents
    fn bind(&self, tree: &mut QueryTree, expr: NodeId) -> CompileResult<()> {
        let kind = tree.kind(expr)?.clone();
        let ty = match kind {
            NodeKind::ColumnReference(col) => {
                let (source, ty) = self.resolve_column(col.table.as_deref(), &col.column)?;
                if let NodeKind::ColumnReference(col) = tree.kind_mut(expr)? {
                    col.source = Some(source);
                }
                Some(ty)
            }
            NodeKind::Constant(value) => Some(literal_type(&value)),
            NodeKind::Parameter { .. } => None,
            NodeKind::BinaryOperator(op) => Some(self.bind_binary(tree, expr, op)?),
            NodeKind::Aggregate(agg) => {
                let operand = tree.children(expr)?.first().copied();
                let input = match operand {
                    Some(operand) => {
                        let mut nested = HasNodeVisitor::new(|k| matches!(k, NodeKind::Aggregate(_)));
                        traverse(tree, operand, &mut nested)?;
                        if nested.has_node() {
                            return Err(CompileError::resolution(
                                SqlState::AggregateContainsAggregate,
                                format!("Aggregate {} contains one or more aggregates", agg.name),
                            ));
                        }
                        self.bind(tree, operand)?;
                        let ty = tree.type_of(operand)?.cloned().unwrap_or_else(untyped_parameter);
                        tree.node_mut(operand)?.set_type_desc(ty.clone());
                        Some(ty)
                    }
                    None => None,
                };
                let resolution = self.aggregates.resolve(&agg.name, input.as_ref())?;
                let result_type = resolution.result_type.clone();
                if let NodeKind::Aggregate(node) = tree.kind_mut(expr)? {
                    node.resolution = Some(resolution);
                }
                Some(result_type)
            }
            NodeKind::WindowFunction { name } => {
                if !WINDOW_FUNCTIONS.contains(&name.as_str()) {
                    return Err(CompileError::resolution(
                        SqlState::NoSuchFunction,
                        format!("No window function named '{}' is defined", name),
                    ));
                }
                Some(TypeDescriptor::new(TypeId::BigInt, false))
            }
            other => {
                return Err(CompileError::internal(format!(
                    "{} is not an expression",
                    other.node_name()
                )))
            }
        };

        if let Some(ty) = ty {
            tree.node_mut(expr)?.set_type_desc(ty);
        }
        Ok(())
    }

    fn resolve_column(
        &self,
        qualifier: Option<&str>,
        column: &str,
    ) -> CompileResult<(ColumnSource, TypeDescriptor)> {
        let not_found = || {
            let name = match qualifier {
                Some(q) => format!("{}.{}", q, column),
                None => column.to_string(),
            };
            CompileError::resolution(
                SqlState::ColumnNotFound,
                format!("Column '{}' is not in any table in the FROM list", name),
            )
        };

        let mut found = None;
        for (table_number, entry) in self.scope.iter().enumerate() {
            if qualifier.is_some_and(|q| q != entry.exposed_name) {
                continue;
            }
            if let Some(desc) = entry.descriptor.column(column) {
                if found.is_some() {
                    return Err(CompileError::resolution(
                        SqlState::AmbiguousColumnName,
                        format!("Column name '{}' is in more than one table in the FROM list", column),
                    ));
                }
                found = Some((
                    ColumnSource { table_number, column_position: desc.position() },
                    desc.type_desc().clone(),
                ));
            }
        }
        found.ok_or_else(not_found)
    }

    fn bind_binary(
        &self,
        tree: &mut QueryTree,
        expr: NodeId,
        op: BinaryOperator,
    ) -> CompileResult<TypeDescriptor> {
        let left = tree.child(expr, 0)?;
        let right = tree.child(expr, 1)?;
        self.bind(tree, left)?;
        self.bind(tree, right)?;

        let (lt, rt) = match (tree.type_of(left)?.cloned(), tree.type_of(right)?.cloned()) {
            (Some(l), Some(r)) => (l, r),
            (None, None) => {
                return Err(CompileError::resolution(
                    SqlState::BothOperandsParameters,
                    format!("It is not allowed for both operands of '{}' to be ? parameters", op.symbol()),
                ))
            }
            (Some(l), None) => {
                let r = parameter_type(op, &l);
                tree.node_mut(right)?.set_type_desc(r.clone());
                (l, r)
            }
            (None, Some(r)) => {
                let l = parameter_type(op, &r);
                tree.node_mut(left)?.set_type_desc(l.clone());
                (l, r)
            }
        };
        let nullable = lt.is_nullable() || rt.is_nullable();

        if op.is_comparison() {
            let comparable = lt.type_id().comparable_with(&rt.type_id())
                && (!op.is_range() || lt.type_id().is_orderable());
            if !comparable {
                return Err(CompileError::resolution(
                    SqlState::NotComparable,
                    format!("Comparisons between '{}' and '{}' are not supported", lt.type_id(), rt.type_id()),
                ));
            }
            Ok(TypeDescriptor::new(TypeId::Boolean, nullable))
        } else if op.is_logical() {
            if lt.type_id() != TypeId::Boolean || rt.type_id() != TypeId::Boolean {
                return Err(CompileError::resolution(
                    SqlState::LogicalNonBoolean,
                    format!("An {} has a non-boolean operand", op.symbol()),
                ));
            }
            Ok(TypeDescriptor::new(TypeId::Boolean, nullable))
        } else {
            lt.dominant_numeric(&rt).ok_or_else(|| {
                CompileError::resolution(
                    SqlState::BinaryOperatorNotSupported,
                    format!(
                        "The '{}' operator with a left operand type of '{}' and a right operand type of '{}' is not supported",
                        op.symbol(),
                        lt.type_id(),
                        rt.type_id()
                    ),
                )
            })
        }
    }
}

/// Type of a `?` operand from the other operand of `op`
fn parameter_type(op: BinaryOperator, other: &TypeDescriptor) -> TypeDescriptor {
    if op.is_logical() {
        TypeDescriptor::new(TypeId::Boolean, true)
    } else {
        other.with_nullable(true)
    }
}

fn literal_type(value: &Literal) -> TypeDescriptor {
    match value {
        Literal::Integer(v) if i32::try_from(*v).is_ok() => TypeDescriptor::new(TypeId::Integer, false),
        Literal::Integer(_) => TypeDescriptor::new(TypeId::BigInt, false),
        Literal::Double(_) => TypeDescriptor::new(TypeId::Double, false),
        Literal::String(s) => TypeDescriptor::char(s.chars().count().max(1) as u32, false),
        Literal::Boolean(_) => TypeDescriptor::new(TypeId::Boolean, false),
    }
}

/// Whether two window definitions have the same PARTITION BY and ORDER BY
fn equivalent_windows(tree: &QueryTree, a: NodeId, b: NodeId) -> CompileResult<bool> {
    Ok(tree.structurally_equal(tree.child(a, WINDOW_PARTITION)?, tree.child(b, WINDOW_PARTITION)?)
        && tree.structurally_equal(tree.child(a, WINDOW_ORDER)?, tree.child(b, WINDOW_ORDER)?))
}

fn bind_window_definition(
    tree: &mut QueryTree,
    definition: NodeId,
    binder: &ExpressionBinder<'_>,
) -> CompileResult<()> {
    for expr in tree.children(tree.child(definition, WINDOW_PARTITION)?)?.to_vec() {
        binder.bind(tree, expr)?;
    }
    for key in tree.children(tree.child(definition, WINDOW_ORDER)?)?.to_vec() {
        let expr = tree.child(key, 0)?;
        binder.bind(tree, expr)?;
    }
    Ok(())
}

fn bind_windows(tree: &mut QueryTree, select: NodeId, binder: &ExpressionBinder<'_>) -> CompileResult<()> {
    let window_list = tree.child(select, SELECT_WINDOWS)?;
    for definition in tree.children(window_list)?.to_vec() {
        bind_window_definition(tree, definition, binder)?;
    }

    let result_columns = tree.child(select, SELECT_RESULT_COLUMNS)?;
    let mut functions = CollectNodesVisitor::new(|k| matches!(k, NodeKind::WindowFunction { .. }));
    traverse(tree, result_columns, &mut functions)?;

    for function in functions.into_collected() {
        let window = tree.child(function, 0)?;
        match tree.kind(window)?.clone() {
            NodeKind::WindowReference(reference) => {
                let mut target = None;
                for candidate in tree.children(window_list)? {
                    if let NodeKind::WindowDefinition(def) = tree.kind(*candidate)? {
                        if !def.is_inlined() && def.name() == reference.name() {
                            target = Some(*candidate);
                            break;
                        }
                    }
                }
                let target = target.ok_or_else(|| {
                    CompileError::resolution(
                        SqlState::NoSuchWindow,
                        format!("Window '{}' is not defined", reference.name()),
                    )
                })?;
                if let NodeKind::WindowReference(reference) = tree.kind_mut(window)? {
                    reference.resolve_to(target);
                }
            }
            NodeKind::WindowDefinition(_) => {
                bind_window_definition(tree, window, binder)?;

                let mut equivalent = None;
                for candidate in tree.children(window_list)?.to_vec() {
                    if candidate != window && equivalent_windows(tree, candidate, window)? {
                        equivalent = Some(candidate);
                        break;
                    }
                }
                match equivalent {
                    Some(existing) => {
                        let mut replace = ReplaceNodeVisitor::new(window, existing);
                        traverse(tree, function, &mut replace)?;
                        debug!("Inline window {} shares definition {}", window, existing);
                    }
                    None => tree.push_child(window_list, window)?,
                }
            }
            other => {
                return Err(CompileError::internal(format!(
                    "window function over a {}",
                    other.node_name()
                )))
            }
        }
    }
    Ok(())
}

/// Same value source: equal column bindings, or structurally equal expressions
fn same_expression(tree: &QueryTree, a: NodeId, b: NodeId) -> CompileResult<bool> {
    match (tree.kind(a)?, tree.kind(b)?) {
        (NodeKind::ColumnReference(x), NodeKind::ColumnReference(y)) => {
            Ok(x.source.is_some() && x.source == y.source)
        }
        _ => Ok(tree.structurally_equal(a, b)),
    }
}

/// First column reference in `expr` that is neither grouped nor inside an aggregate
fn ungrouped_column(tree: &QueryTree, expr: NodeId, grouping: &[NodeId]) -> CompileResult<Option<NodeId>> {
    for group in grouping {
        if same_expression(tree, expr, *group)? {
            return Ok(None);
        }
    }
    match tree.kind(expr)? {
        NodeKind::Aggregate(_) | NodeKind::WindowFunction { .. } => Ok(None),
        NodeKind::ColumnReference(_) => Ok(Some(expr)),
        _ => {
            for child in tree.children(expr)? {
                if let Some(column) = ungrouped_column(tree, *child, grouping)? {
                    return Ok(Some(column));
                }
            }
            Ok(None)
        }
    }
}

fn check_grouping(tree: &mut QueryTree, select: NodeId) -> CompileResult<()> {
    let result_columns = tree.child(select, SELECT_RESULT_COLUMNS)?;
    let grouping = tree.children(tree.child(select, SELECT_GROUP_BY)?)?.to_vec();

    let mut has_aggregate = HasNodeVisitor::new(|k| matches!(k, NodeKind::Aggregate(_)));
    traverse(tree, result_columns, &mut has_aggregate)?;
    if grouping.is_empty() && !has_aggregate.has_node() {
        return Ok(());
    }

    for column in tree.children(result_columns)?.to_vec() {
        let expr = tree.child(column, 0)?;
        let Some(offender) = ungrouped_column(tree, expr, &grouping)? else {
            continue;
        };
        let name = match tree.kind(offender)? {
            NodeKind::ColumnReference(col) => col.column.clone(),
            other => other.node_name().to_string(),
        };
        let state = if grouping.is_empty() {
            SqlState::ColumnNotInNonGroupedSelect
        } else {
            SqlState::ColumnNotInGroupedSelect
        };
        return Err(CompileError::resolution(
            state,
            format!(
                "Column reference '{}' is invalid: the SELECT list may only hold grouping expressions and aggregates",
                name
            ),
        ));
    }
    Ok(())
}
