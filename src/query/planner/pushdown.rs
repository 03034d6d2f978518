// Predicate Pushdown
//
// Moves WHERE conjuncts that reference columns of exactly one FROM table
// under that table's node, where the optimizer charges them to the table's
// scan instead of to the join.

use log::debug;

use crate::common::{CompileError, CompileResult, NodeId};
use crate::query::tree::node::{SELECT_FROM_LIST, SELECT_WHERE};
use crate::query::tree::{NodeKind, QueryTree};
use crate::query::visitor::{traverse, CollectNodesVisitor};

/// FROM positions of the tables whose columns `expr` reads, sorted, no duplicates
pub fn referenced_tables(tree: &mut QueryTree, expr: NodeId) -> CompileResult<Vec<usize>> {
    let mut collector = CollectNodesVisitor::new(|k| matches!(k, NodeKind::ColumnReference(_)));
    traverse(tree, expr, &mut collector)?;

    let mut tables = Vec::new();
    for column in collector.into_collected() {
        let NodeKind::ColumnReference(col) = tree.kind(column)? else {
            continue;
        };
        let source = col.source.ok_or_else(|| {
            CompileError::internal(format!("column {} has not been bound", col.column))
        })?;
        tables.push(source.table_number);
    }
    tables.sort_unstable();
    tables.dedup();
    Ok(tables)
}

/// Push single-table conjuncts of a bound SELECT; returns how many moved
pub fn push_down_predicates(tree: &mut QueryTree, select: NodeId) -> CompileResult<usize> {
    let predicates = tree.child(select, SELECT_WHERE)?;
    let from_list = tree.child(select, SELECT_FROM_LIST)?;
    let tables = tree.children(from_list)?.to_vec();

    let mut pushed = Vec::new();
    let conjuncts = tree.children(predicates)?.to_vec();
    for (slot, conjunct) in conjuncts.into_iter().enumerate() {
        let referenced = referenced_tables(tree, conjunct)?;
        let [table_number] = referenced[..] else {
            continue;
        };
        let Some(&table) = tables.get(table_number) else {
            return Err(CompileError::internal(format!(
                "column bound to FROM position {} of a {}-table FROM list",
                table_number,
                tables.len()
            )));
        };
        pushed.push((slot, conjunct, table, table_number));
    }

    for (slot, _, _, _) in pushed.iter().rev() {
        tree.remove_child(predicates, *slot)?;
    }
    for (_, conjunct, table, table_number) in &pushed {
        tree.push_child(*table, *conjunct)?;
        debug!("Pushed predicate {} down to FROM table {}", conjunct, table_number);
    }
    Ok(pushed.len())
}
