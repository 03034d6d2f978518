// Statistics Interface
//
// The optimizer asks a `StatisticsProvider` for table cardinalities and
// predicate selectivities. How the storage layer derives those numbers is not
// the compiler's concern; `TableStatistics` is a fixed-table implementation.

use std::collections::HashMap;

use crate::catalog::TableDescriptor;
use crate::common::{CompileResult, CompilerConfig, NodeId};
use crate::query::tree::{BinaryOperator, NodeKind, QueryTree};

/// Storage statistics collaborator
pub trait StatisticsProvider: Send + Sync {
    /// Estimated number of rows in a table
    fn row_count(&self, table: &TableDescriptor) -> CompileResult<f64>;

    /// Fraction of rows expected to satisfy `predicate`
    fn selectivity(
        &self,
        tree: &QueryTree,
        predicate: NodeId,
        config: &CompilerConfig,
    ) -> CompileResult<f64> {
        heuristic_selectivity(tree, predicate, config)
    }
}

/// Selectivity from the shape of the predicate alone
pub fn heuristic_selectivity(
    tree: &QueryTree,
    predicate: NodeId,
    config: &CompilerConfig,
) -> CompileResult<f64> {
    let NodeKind::BinaryOperator(op) = tree.kind(predicate)? else {
        return Ok(config.default_selectivity);
    };

    let selectivity = match op {
        BinaryOperator::Equals => config.equality_selectivity,
        BinaryOperator::NotEquals => 1.0 - config.equality_selectivity,
        op if op.is_range() => config.range_selectivity,
        BinaryOperator::And | BinaryOperator::Or => {
            let left = heuristic_selectivity(tree, tree.child(predicate, 0)?, config)?;
            let right = heuristic_selectivity(tree, tree.child(predicate, 1)?, config)?;
            if *op == BinaryOperator::And {
                left * right
            } else {
                left + right - left * right
            }
        }
        _ => config.default_selectivity,
    };
    Ok(selectivity)
}

/// Row counts keyed by qualified table name
#[derive(Debug, Clone)]
pub struct TableStatistics {
    row_counts: HashMap<String, f64>,
    default_row_count: f64,
}

impl Default for TableStatistics {
    fn default() -> Self {
        TableStatistics { row_counts: HashMap::new(), default_row_count: 1000.0 }
    }
}

impl TableStatistics {
    pub fn new(default_row_count: f64) -> Self {
        TableStatistics { row_counts: HashMap::new(), default_row_count }
    }

    /// Record the row count of `SCHEMA.TABLE`
    pub fn with_table(mut self, qualified_name: &str, rows: f64) -> Self {
        self.row_counts.insert(qualified_name.to_uppercase(), rows);
        self
    }
}

impl StatisticsProvider for TableStatistics {
    fn row_count(&self, table: &TableDescriptor) -> CompileResult<f64> {
        Ok(self
            .row_counts
            .get(&table.qualified_name())
            .copied()
            .unwrap_or(self.default_row_count))
    }
}
