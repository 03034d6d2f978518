// Cursor Statements
//
// A query: a SELECT tree that binds against the dictionary, is optimized into
// a join order with a Level-2 estimate, and is handed to the code generator.

use log::debug;

use crate::common::{CompileError, CompileResult, ContextId, NodeId};
use crate::query::binder::bind_select;
use crate::query::generate::{generate_cursor_plan, Action, CursorPlanRequest};
use crate::query::planner::{
    push_down_predicates, CostEstimate, JoinOrderOptimizer, Level2CostEstimate,
};
use crate::query::statement::{
    ActivationKind, BindContext, GenerateContext, OptimizeContext, StatementNode,
};
use crate::query::tree::{NodeKind, QueryTree};

#[derive(Debug)]
pub struct CursorStatement {
    tree: QueryTree,
    root: NodeId,
    activation: ActivationKind,
    parameter_count: usize,
    bound: bool,
    best_cost: Option<Level2CostEstimate>,
    join_order: Option<Vec<usize>>,
}

impl CursorStatement {
    /// Wrap a SELECT tree. Queries with `?` parameters need a full activation.
    pub fn new(tree: QueryTree, root: NodeId) -> CompileResult<Self> {
        if !matches!(tree.kind(root)?, NodeKind::Select(_)) {
            return Err(CompileError::internal(format!(
                "a cursor must be rooted at a SELECT, not a {}",
                tree.kind(root)?.node_name()
            )));
        }

        let mut parameter_count = 0;
        for id in tree.reachable(root) {
            if matches!(tree.kind(id)?, NodeKind::Parameter { .. }) {
                parameter_count += 1;
            }
        }
        let activation = if parameter_count > 0 {
            ActivationKind::NeedsFullActivation
        } else {
            ActivationKind::NeedsRowActivation
        };

        Ok(CursorStatement {
            tree,
            root,
            activation,
            parameter_count,
            bound: false,
            best_cost: None,
            join_order: None,
        })
    }

    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Estimate of the chosen plan, once optimized
    pub fn best_cost(&self) -> Option<&Level2CostEstimate> {
        self.best_cost.as_ref()
    }

    pub fn join_order(&self) -> Option<&[usize]> {
        self.join_order.as_deref()
    }

    fn require_bound(&self, phase: &str) -> CompileResult<()> {
        if self.bound {
            Ok(())
        } else {
            Err(CompileError::internal(format!("cannot {} an unbound {}", phase, self.statement_name())))
        }
    }
}

impl StatementNode for CursorStatement {
    fn statement_name(&self) -> &'static str {
        "SELECT"
    }

    fn context(&self) -> ContextId {
        self.tree.context()
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> CompileResult<()> {
        self.bound = false;
        self.best_cost = None;
        self.join_order = None;
        bind_select(&mut self.tree, self.root, ctx)?;
        self.bound = true;
        Ok(())
    }

    fn optimize(&mut self, ctx: &OptimizeContext<'_>) -> CompileResult<()> {
        self.require_bound("optimize")?;
        if ctx.config.predicate_pushdown {
            let moved = push_down_predicates(&mut self.tree, self.root)?;
            debug!("Predicate pushdown moved {} conjunct(s)", moved);
        }

        let optimizer = JoinOrderOptimizer::new(ctx.statistics, ctx.config);
        let plan = optimizer.optimize_select::<Level2CostEstimate>(&mut self.tree, self.root)?;
        self.join_order = Some(plan.order);
        self.best_cost = Some(plan.cost);
        Ok(())
    }

    fn generate(&self, ctx: &GenerateContext<'_>) -> CompileResult<Action> {
        self.require_bound("generate")?;
        let request = CursorPlanRequest {
            tree: &self.tree,
            root: self.root,
            activation: self.activation,
            cost: self.best_cost.as_ref(),
            join_order: self.join_order.as_deref(),
        };
        generate_cursor_plan(ctx.generator, &request)
    }

    fn activation_kind(&self) -> ActivationKind {
        self.activation
    }

    fn needs_savepoint(&self) -> bool {
        false
    }

    fn row_estimate(&self) -> i64 {
        self.best_cost.as_ref().map_or(0, |c| c.estimated_row_count())
    }

    fn tree_print(&self) -> String {
        self.tree.tree_print(self.root)
    }
}
