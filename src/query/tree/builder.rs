// Tree Builder
//
// Convenience constructors used by a front end (and by tests) to assemble a
// statement tree under one compilation frame.

use crate::common::{CompileResult, NodeId};
use crate::query::context::ContextFrame;
use crate::query::tree::arena::QueryTree;
use crate::query::tree::node::{
    AggregateNode, BinaryOperator, ColumnReference, FromBaseTable, Literal, NodeKind, SelectNode,
    TableName,
};
use crate::query::tree::window::{WindowDefinition, WindowReference};

/// Clauses of a SELECT block handed to `TreeBuilder::select`
#[derive(Debug, Default)]
pub struct SelectParts {
    pub distinct: bool,
    /// Result expressions, each with an optional AS name
    pub columns: Vec<(NodeId, Option<String>)>,
    /// `FromBaseTable` nodes
    pub from: Vec<NodeId>,
    pub where_clause: Option<NodeId>,
    pub group_by: Vec<NodeId>,
    /// Named `WindowDefinition` nodes from the WINDOW clause
    pub windows: Vec<NodeId>,
}

pub struct TreeBuilder<'f> {
    frame: &'f ContextFrame,
    tree: QueryTree,
}

impl<'f> TreeBuilder<'f> {
    pub fn new(frame: &'f ContextFrame) -> Self {
        TreeBuilder { frame, tree: QueryTree::new(frame) }
    }

    pub fn frame(&self) -> &'f ContextFrame {
        self.frame
    }

    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut QueryTree {
        &mut self.tree
    }

    pub fn finish(self) -> QueryTree {
        self.tree
    }

    pub fn add(&mut self, kind: NodeKind, children: Vec<NodeId>) -> CompileResult<NodeId> {
        self.tree.add(self.frame, kind, children)
    }

    pub fn column(&mut self, table: Option<&str>, column: &str) -> CompileResult<NodeId> {
        self.add(
            NodeKind::ColumnReference(ColumnReference {
                table: table.map(|t| t.to_uppercase()),
                column: column.to_uppercase(),
                source: None,
            }),
            vec![],
        )
    }

    pub fn literal(&mut self, value: Literal) -> CompileResult<NodeId> {
        self.add(NodeKind::Constant(value), vec![])
    }

    pub fn int(&mut self, value: i64) -> CompileResult<NodeId> {
        self.literal(Literal::Integer(value))
    }

    pub fn string(&mut self, value: &str) -> CompileResult<NodeId> {
        self.literal(Literal::String(value.to_string()))
    }

    pub fn parameter(&mut self, index: usize) -> CompileResult<NodeId> {
        self.add(NodeKind::Parameter { index }, vec![])
    }

    pub fn binary(&mut self, op: BinaryOperator, left: NodeId, right: NodeId) -> CompileResult<NodeId> {
        self.add(NodeKind::BinaryOperator(op), vec![left, right])
    }

    /// AND of all conjuncts, left-deep
    pub fn and_all(&mut self, conjuncts: &[NodeId]) -> CompileResult<Option<NodeId>> {
        let mut iter = conjuncts.iter().copied();
        let Some(mut acc) = iter.next() else {
            return Ok(None);
        };
        for next in iter {
            acc = self.binary(BinaryOperator::And, acc, next)?;
        }
        Ok(Some(acc))
    }

    pub fn aggregate(&mut self, name: &str, distinct: bool, operand: NodeId) -> CompileResult<NodeId> {
        self.add(
            NodeKind::Aggregate(AggregateNode {
                name: name.to_uppercase(),
                distinct,
                resolution: None,
            }),
            vec![operand],
        )
    }

    pub fn count_star(&mut self) -> CompileResult<NodeId> {
        self.add(
            NodeKind::Aggregate(AggregateNode {
                name: "COUNT".to_string(),
                distinct: false,
                resolution: None,
            }),
            vec![],
        )
    }

    pub fn table(
        &mut self,
        schema: Option<&str>,
        name: &str,
        correlation: Option<&str>,
    ) -> CompileResult<NodeId> {
        self.add(
            NodeKind::FromBaseTable(FromBaseTable {
                table_name: TableName::new(schema, name),
                correlation: correlation.map(|c| c.to_uppercase()),
                descriptor: None,
                table_number: None,
            }),
            vec![],
        )
    }

    /// Window definition with PARTITION BY expressions and `(expression, ascending)` ORDER BY keys
    pub fn window_definition(
        &mut self,
        name: Option<&str>,
        partition: Vec<NodeId>,
        order: Vec<(NodeId, bool)>,
    ) -> CompileResult<NodeId> {
        let partition = self.add(NodeKind::PartitionByList, partition)?;
        let mut keys = Vec::with_capacity(order.len());
        for (expr, ascending) in order {
            keys.push(self.add(NodeKind::OrderByColumn { ascending }, vec![expr])?);
        }
        let order = self.add(NodeKind::OrderByList, keys)?;
        self.add(
            NodeKind::WindowDefinition(WindowDefinition::new(name)),
            vec![partition, order],
        )
    }

    pub fn window_reference(&mut self, name: &str) -> CompileResult<NodeId> {
        self.add(NodeKind::WindowReference(WindowReference::new(name)), vec![])
    }

    pub fn window_function(&mut self, name: &str, window: NodeId) -> CompileResult<NodeId> {
        self.add(NodeKind::WindowFunction { name: name.to_uppercase() }, vec![window])
    }

    /// Assemble a SELECT block. The WHERE clause is split on top-level ANDs
    /// into a predicate list.
    pub fn select(&mut self, parts: SelectParts) -> CompileResult<NodeId> {
        let mut result_columns = Vec::with_capacity(parts.columns.len());
        for (expr, name) in parts.columns {
            let name = name.map(|n| n.to_uppercase()).or_else(|| {
                match self.tree.kind(expr) {
                    Ok(NodeKind::ColumnReference(col)) => Some(col.column.clone()),
                    _ => None,
                }
            });
            result_columns.push(self.add(NodeKind::ResultColumn { name }, vec![expr])?);
        }
        let result_columns = self.add(NodeKind::ResultColumnList, result_columns)?;
        let from = self.add(NodeKind::FromList, parts.from)?;

        let mut conjuncts = Vec::new();
        if let Some(where_clause) = parts.where_clause {
            self.split_conjuncts(where_clause, &mut conjuncts)?;
        }
        let predicates = self.add(NodeKind::PredicateList, conjuncts)?;
        let group_by = self.add(NodeKind::GroupByList, parts.group_by)?;
        let windows = self.add(NodeKind::WindowList, parts.windows)?;

        self.add(
            NodeKind::Select(SelectNode { distinct: parts.distinct, join_order: None }),
            vec![result_columns, from, predicates, group_by, windows],
        )
    }

    fn split_conjuncts(&self, expr: NodeId, out: &mut Vec<NodeId>) -> CompileResult<()> {
        if let NodeKind::BinaryOperator(BinaryOperator::And) = self.tree.kind(expr)? {
            let children = self.tree.children(expr)?.to_vec();
            for child in children {
                self.split_conjuncts(child, out)?;
            }
        } else {
            out.push(expr);
        }
        Ok(())
    }
}
