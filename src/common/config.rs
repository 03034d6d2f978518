// Compiler Configuration
//
// Tunables for binding and optimization. Values come from `Default` and can be
// overridden from the environment.

use serde::{Deserialize, Serialize};

/// Configuration consulted by every compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Schema used for unqualified object names
    pub default_schema: String,
    /// Move single-table WHERE predicates under their table
    pub predicate_pushdown: bool,
    /// Largest FROM list whose join orders are searched exhaustively
    pub max_exhaustive_join_tables: usize,
    /// Selectivity of a predicate with no recognisable shape
    pub default_selectivity: f64,
    /// Selectivity of an equality predicate
    pub equality_selectivity: f64,
    /// Selectivity of a range predicate (<, <=, >, >=)
    pub range_selectivity: f64,
    /// Cost units charged per row read from a table
    pub row_read_cost: f64,
    /// Dump the bound and optimized tree at debug level
    pub trace_tree: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            default_schema: "APP".to_string(),
            predicate_pushdown: true,
            max_exhaustive_join_tables: 6,
            default_selectivity: 0.5,
            equality_selectivity: 0.1,
            range_selectivity: 0.33,
            row_read_cost: 1.0,
            trace_tree: false,
        }
    }
}

impl CompilerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SQLFORGE_DEFAULT_SCHEMA`
    /// - `SQLFORGE_PREDICATE_PUSHDOWN` (`true`/`false`)
    /// - `SQLFORGE_MAX_EXHAUSTIVE_JOIN_TABLES`
    /// - `SQLFORGE_DEFAULT_SELECTIVITY`, `SQLFORGE_EQUALITY_SELECTIVITY`,
    ///   `SQLFORGE_RANGE_SELECTIVITY` (ignored outside 0..=1)
    /// - `SQLFORGE_ROW_READ_COST`
    /// - `SQLFORGE_TRACE_TREE` (`true`/`false`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = var("SQLFORGE_DEFAULT_SCHEMA") {
            if !s.trim().is_empty() {
                cfg.default_schema = s.trim().to_uppercase();
            }
        }

        if let Some(v) = var("SQLFORGE_PREDICATE_PUSHDOWN").and_then(|s| s.parse::<bool>().ok()) {
            cfg.predicate_pushdown = v;
        }

        if let Some(v) = var("SQLFORGE_MAX_EXHAUSTIVE_JOIN_TABLES").and_then(|s| s.parse::<usize>().ok()) {
            cfg.max_exhaustive_join_tables = v;
        }

        let selectivity = |key: &str| {
            var(key)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| (0.0..=1.0).contains(v))
        };
        if let Some(v) = selectivity("SQLFORGE_DEFAULT_SELECTIVITY") {
            cfg.default_selectivity = v;
        }
        if let Some(v) = selectivity("SQLFORGE_EQUALITY_SELECTIVITY") {
            cfg.equality_selectivity = v;
        }
        if let Some(v) = selectivity("SQLFORGE_RANGE_SELECTIVITY") {
            cfg.range_selectivity = v;
        }

        if let Some(v) = var("SQLFORGE_ROW_READ_COST").and_then(|s| s.parse::<f64>().ok()) {
            if v >= 0.0 {
                cfg.row_read_cost = v;
            }
        }

        if let Some(v) = var("SQLFORGE_TRACE_TREE").and_then(|s| s.parse::<bool>().ok()) {
            cfg.trace_tree = v;
        }

        cfg
    }
}
