// Tree Node Definitions
//
// Every clause and expression of a statement is a `Node` stored in a
// `QueryTree` arena. A node's payload is its `NodeKind`; its sub-nodes are
// child slots holding `NodeId`s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{TableDescriptor, TypeDescriptor};
use crate::common::{ContextId, NodeId};
use crate::common::types::Span;
use crate::query::aggregate::AggregateResolution;
use crate::query::tree::window::{WindowDefinition, WindowReference};

/// Child slot layout of a `Select` node
pub const SELECT_RESULT_COLUMNS: usize = 0;
pub const SELECT_FROM_LIST: usize = 1;
pub const SELECT_WHERE: usize = 2;
pub const SELECT_GROUP_BY: usize = 3;
pub const SELECT_WINDOWS: usize = 4;
pub const SELECT_SLOT_COUNT: usize = 5;

/// Child slot layout of a `WindowDefinition` node
pub const WINDOW_PARTITION: usize = 0;
pub const WINDOW_ORDER: usize = 1;

/// Possibly schema-qualified object name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        TableName {
            schema: schema.map(|s| s.to_uppercase()),
            name: name.to_uppercase(),
        }
    }

    pub fn unqualified(name: &str) -> Self {
        Self::new(None, name)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Literal values appearing in a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Double(f64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Double(v) => write!(f, "{}", v),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    And,
    Or,
    Plus,
    Minus,
    Times,
    Divide,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEquals => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEquals => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEquals
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEquals
        )
    }

    pub fn is_range(&self) -> bool {
        matches!(
            self,
            BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEquals
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEquals
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Times | BinaryOperator::Divide
        )
    }
}

/// Where a bound column reference reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSource {
    /// Position of the source table in the FROM list
    pub table_number: usize,
    /// 1-based column position within that table
    pub column_position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReference {
    /// Table or correlation name qualifying the column, if written
    pub table: Option<String>,
    pub column: String,
    /// Filled in by bind
    pub source: Option<ColumnSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromBaseTable {
    pub table_name: TableName,
    pub correlation: Option<String>,
    /// Filled in by bind
    pub descriptor: Option<TableDescriptor>,
    /// Filled in by bind
    pub table_number: Option<usize>,
}

impl FromBaseTable {
    /// Name by which columns may qualify this table
    pub fn exposed_name(&self) -> &str {
        self.correlation.as_deref().unwrap_or(&self.table_name.name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectNode {
    pub distinct: bool,
    /// FROM list positions in the order chosen by the optimizer
    pub join_order: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateNode {
    /// Aggregate name as written, upper case
    pub name: String,
    pub distinct: bool,
    /// Filled in by bind
    pub resolution: Option<AggregateResolution>,
}

/// Payload of a tree node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// SELECT block; children follow the `SELECT_*` slot layout
    Select(SelectNode),
    ResultColumnList,
    /// Children: `[expression]`
    ResultColumn { name: Option<String> },
    FromList,
    /// Children: predicates pushed down to this table
    FromBaseTable(FromBaseTable),
    /// Children: conjuncts
    PredicateList,
    GroupByList,
    WindowList,
    PartitionByList,
    OrderByList,
    /// Children: `[expression]`
    OrderByColumn { ascending: bool },
    /// Children follow the `WINDOW_*` slot layout
    WindowDefinition(WindowDefinition),
    WindowReference(WindowReference),
    ColumnReference(ColumnReference),
    Constant(Literal),
    /// `?` parameter, 0-based
    Parameter { index: usize },
    /// Children: `[left, right]`
    BinaryOperator(BinaryOperator),
    /// Children: `[operand]`, or empty for `COUNT(*)`
    Aggregate(AggregateNode),
    /// Children: `[window]` where window is a definition or a reference
    WindowFunction { name: String },
}

impl NodeKind {
    /// Short node name used in tree dumps and diagnostics
    pub fn node_name(&self) -> &'static str {
        match self {
            NodeKind::Select(_) => "SelectNode",
            NodeKind::ResultColumnList => "ResultColumnList",
            NodeKind::ResultColumn { .. } => "ResultColumn",
            NodeKind::FromList => "FromList",
            NodeKind::FromBaseTable(_) => "FromBaseTable",
            NodeKind::PredicateList => "PredicateList",
            NodeKind::GroupByList => "GroupByList",
            NodeKind::WindowList => "WindowList",
            NodeKind::PartitionByList => "PartitionByList",
            NodeKind::OrderByList => "OrderByList",
            NodeKind::OrderByColumn { .. } => "OrderByColumn",
            NodeKind::WindowDefinition(_) => "WindowDefinitionNode",
            NodeKind::WindowReference(_) => "WindowReferenceNode",
            NodeKind::ColumnReference(_) => "ColumnReference",
            NodeKind::Constant(_) => "ConstantNode",
            NodeKind::Parameter { .. } => "ParameterNode",
            NodeKind::BinaryOperator(_) => "BinaryOperatorNode",
            NodeKind::Aggregate(_) => "AggregateNode",
            NodeKind::WindowFunction { .. } => "WindowFunctionNode",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Select(select) => {
                write!(f, "{} distinct: {}", self.node_name(), select.distinct)?;
                if let Some(order) = &select.join_order {
                    write!(f, " joinOrder: {:?}", order)?;
                }
                Ok(())
            }
            NodeKind::ResultColumn { name } => {
                write!(f, "{} name: {}", self.node_name(), name.as_deref().unwrap_or("<none>"))
            }
            NodeKind::FromBaseTable(table) => {
                write!(f, "{} tableName: {}", self.node_name(), table.table_name)?;
                if let Some(correlation) = &table.correlation {
                    write!(f, " correlation: {}", correlation)?;
                }
                if let Some(number) = table.table_number {
                    write!(f, " tableNumber: {}", number)?;
                }
                Ok(())
            }
            NodeKind::OrderByColumn { ascending } => {
                write!(f, "{} {}", self.node_name(), if *ascending { "ASC" } else { "DESC" })
            }
            NodeKind::WindowDefinition(def) => write!(f, "{} {}", self.node_name(), def),
            NodeKind::WindowReference(reference) => write!(f, "{} {}", self.node_name(), reference),
            NodeKind::ColumnReference(col) => {
                write!(f, "{} ", self.node_name())?;
                if let Some(table) = &col.table {
                    write!(f, "{}.", table)?;
                }
                write!(f, "{}", col.column)?;
                if let Some(src) = &col.source {
                    write!(f, " source: ({}, {})", src.table_number, src.column_position)?;
                }
                Ok(())
            }
            NodeKind::Constant(value) => write!(f, "{} value: {}", self.node_name(), value),
            NodeKind::Parameter { index } => write!(f, "{} index: {}", self.node_name(), index),
            NodeKind::BinaryOperator(op) => write!(f, "{} operator: {}", self.node_name(), op.symbol()),
            NodeKind::Aggregate(agg) => {
                write!(f, "{} {}", self.node_name(), agg.name)?;
                if agg.distinct {
                    write!(f, " DISTINCT")?;
                }
                if let Some(res) = &agg.resolution {
                    write!(f, " aggregator: {}", res.aggregator)?;
                }
                Ok(())
            }
            NodeKind::WindowFunction { name } => write!(f, "{} {}", self.node_name(), name),
            _ => write!(f, "{}", self.node_name()),
        }
    }
}

/// One node of a query tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    /// Frame this node was created under
    pub(crate) context: ContextId,
    pub(crate) span: Option<Span>,
    /// Result type of an expression node, set by bind
    pub(crate) type_desc: Option<TypeDescriptor>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn type_desc(&self) -> Option<&TypeDescriptor> {
        self.type_desc.as_ref()
    }

    pub fn set_type_desc(&mut self, type_desc: TypeDescriptor) {
        self.type_desc = Some(type_desc);
    }
}
