// Join Order Optimizer
//
// Chooses the order in which the tables of a bound SELECT are joined. Each
// candidate order is costed as a left-deep nested-loop join: every row of the
// outer prefix triggers one scan of the next table. The search enumerates
// permutations depth first, reuses one estimate per depth, and abandons a
// prefix as soon as it costs more than the best complete order found so far.

use log::{debug, trace};

use crate::common::{CompileError, CompileResult, CompilerConfig, NodeId};
use crate::query::planner::cost::CostEstimate;
use crate::query::planner::pushdown::referenced_tables;
use crate::query::planner::statistics::StatisticsProvider;
use crate::query::tree::node::{SELECT_FROM_LIST, SELECT_WHERE};
use crate::query::tree::{NodeKind, QueryTree};

/// Costing inputs for one FROM table
#[derive(Debug, Clone, PartialEq)]
pub struct TableInput {
    /// Cost of one full scan
    pub scan_cost: f64,
    /// Rows surviving the table's own predicates
    pub rows: f64,
}

/// A WHERE conjunct joining several tables
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPredicate {
    /// FROM positions the predicate reads
    pub tables: Vec<usize>,
    pub selectivity: f64,
}

/// Chosen order and its estimate
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan<E> {
    pub order: Vec<usize>,
    pub cost: E,
    /// Number of (partial) orders costed
    pub considered: usize,
}

pub struct JoinOrderOptimizer<'a> {
    statistics: &'a dyn StatisticsProvider,
    config: &'a CompilerConfig,
}

impl<'a> JoinOrderOptimizer<'a> {
    pub fn new(statistics: &'a dyn StatisticsProvider, config: &'a CompilerConfig) -> Self {
        JoinOrderOptimizer { statistics, config }
    }

    /// Optimize a bound SELECT and record the chosen order on it
    pub fn optimize_select<E: CostEstimate>(
        &self,
        tree: &mut QueryTree,
        select: NodeId,
    ) -> CompileResult<JoinPlan<E>> {
        let (tables, predicates) = self.costing_inputs(tree, select)?;
        let plan = self.best_order::<E>(&tables, &predicates);
        debug!(
            "Chose join order {:?} after costing {} candidates: {}",
            plan.order, plan.considered, plan.cost
        );

        match tree.kind_mut(select)? {
            NodeKind::Select(node) => node.join_order = Some(plan.order.clone()),
            other => {
                return Err(CompileError::internal(format!(
                    "join ordering expects a SELECT, found {}",
                    other.node_name()
                )))
            }
        }
        Ok(plan)
    }

    fn costing_inputs(
        &self,
        tree: &mut QueryTree,
        select: NodeId,
    ) -> CompileResult<(Vec<TableInput>, Vec<JoinPredicate>)> {
        let from_list = tree.child(select, SELECT_FROM_LIST)?;
        let mut tables = Vec::new();
        for table in tree.children(from_list)?.to_vec() {
            let NodeKind::FromBaseTable(from) = tree.kind(table)? else {
                return Err(CompileError::internal("FROM list holds a non-table node"));
            };
            let descriptor = from.descriptor.as_ref().ok_or_else(|| {
                CompileError::internal(format!("{} has not been bound", from.table_name))
            })?;

            let base_rows = self.statistics.row_count(descriptor)?;
            let mut rows = base_rows;
            for restriction in tree.children(table)? {
                rows *= self.statistics.selectivity(tree, *restriction, self.config)?;
            }
            tables.push(TableInput { scan_cost: base_rows * self.config.row_read_cost, rows });
        }

        let where_list = tree.child(select, SELECT_WHERE)?;
        let mut predicates = Vec::new();
        for conjunct in tree.children(where_list)?.to_vec() {
            let referenced = referenced_tables(tree, conjunct)?;
            let selectivity = self.statistics.selectivity(tree, conjunct, self.config)?;
            predicates.push(JoinPredicate { tables: referenced, selectivity });
        }
        Ok((tables, predicates))
    }

    /// Cheapest order of `tables`, or FROM order when the list is too long to search
    pub fn best_order<E: CostEstimate>(
        &self,
        tables: &[TableInput],
        predicates: &[JoinPredicate],
    ) -> JoinPlan<E> {
        if tables.is_empty() {
            let mut cost = E::default();
            cost.set_cost(0.0, 1.0, 1.0);
            return JoinPlan { order: Vec::new(), cost, considered: 0 };
        }

        let mut search = Search {
            tables,
            predicates,
            order: Vec::with_capacity(tables.len()),
            used: vec![false; tables.len()],
            scratch: vec![E::default(); tables.len()],
            best: None,
            considered: 0,
        };

        if tables.len() > self.config.max_exhaustive_join_tables {
            debug!(
                "{} tables exceed the exhaustive search limit of {}; keeping FROM order",
                tables.len(),
                self.config.max_exhaustive_join_tables
            );
            search.cost_fixed_order();
        } else {
            search.extend(0, 0.0, 1.0);
        }

        let considered = search.considered;
        let (order, cost) = search.best.unwrap_or_else(|| ((0..tables.len()).collect(), E::uninitialized()));
        JoinPlan { order, cost, considered }
    }
}

struct Search<'t, E> {
    tables: &'t [TableInput],
    predicates: &'t [JoinPredicate],
    order: Vec<usize>,
    used: Vec<bool>,
    /// One estimate per depth, rewritten for every candidate at that depth
    scratch: Vec<E>,
    best: Option<(Vec<usize>, E)>,
    considered: usize,
}

impl<E: CostEstimate> Search<'_, E> {
    /// Combined selectivity of the predicates that become evaluable once
    /// `table` joins the current prefix
    fn join_selectivity(&self, table: usize) -> f64 {
        self.predicates
            .iter()
            .filter(|p| {
                if p.tables.is_empty() {
                    return self.order.is_empty();
                }
                p.tables.contains(&table)
                    && p.tables.iter().all(|t| *t == table || self.used[*t])
            })
            .map(|p| p.selectivity)
            .product()
    }

    /// Cost the prefix extended by `table` into the estimate for `depth`
    fn place(&mut self, depth: usize, table: usize, outer_cost: f64, outer_rows: f64) -> (f64, f64) {
        let input = &self.tables[table];
        let selectivity = self.join_selectivity(table);
        let cost = outer_cost + outer_rows * input.scan_cost;
        let rows = outer_rows * input.rows * selectivity;

        let reuse = std::mem::take(&mut self.scratch[depth]);
        let mut estimate = reuse.reset(cost, rows);
        estimate.set_single_scan_row_count(input.rows);
        self.scratch[depth] = estimate;
        self.considered += 1;
        (cost, rows)
    }

    fn beaten(&self, depth: usize) -> bool {
        match &self.best {
            Some((_, best)) => self.scratch[depth].compare(best) >= 0.0,
            None => false,
        }
    }

    fn extend(&mut self, depth: usize, outer_cost: f64, outer_rows: f64) {
        if depth == self.tables.len() {
            let candidate = &self.scratch[depth - 1];
            trace!("Complete join order {:?}: {}", self.order, candidate);
            if !self.beaten(depth - 1) {
                self.best = Some((self.order.clone(), candidate.clone()));
            }
            return;
        }

        for table in 0..self.tables.len() {
            if self.used[table] {
                continue;
            }
            let (cost, rows) = self.place(depth, table, outer_cost, outer_rows);
            if self.beaten(depth) {
                trace!("Pruned join prefix {:?} + {}: {}", self.order, table, self.scratch[depth]);
                continue;
            }

            self.used[table] = true;
            self.order.push(table);
            self.extend(depth + 1, cost, rows);
            self.order.pop();
            self.used[table] = false;
        }
    }

    fn cost_fixed_order(&mut self) {
        let (mut cost, mut rows) = (0.0, 1.0);
        for table in 0..self.tables.len() {
            (cost, rows) = self.place(table, table, cost, rows);
            self.used[table] = true;
            self.order.push(table);
        }
        let last = self.tables.len() - 1;
        self.best = Some((self.order.clone(), self.scratch[last].clone()));
    }
}
