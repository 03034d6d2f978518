use anyhow::Result;

use sqlforge::common::NodeId;
use sqlforge::query::planner::{CostEstimate, JoinOrderOptimizer, Level2CostEstimate};
use sqlforge::query::statement::{CursorStatement, OptimizeContext};
use sqlforge::query::tree::node::{SELECT_FROM_LIST, SELECT_WHERE};
use sqlforge::query::tree::{BinaryOperator, NodeKind, QueryTree, SelectParts, TreeBuilder};
use sqlforge::{CompileResult, CompilerConfig, ContextFrame, ContextManager, StatementNode};

#[path = "../common/mod.rs"]
mod common;

use common::Fixture;

// SELECT c.name FROM customers c, orders o
// WHERE c.id = o.customer_id AND c.region = 'EU' AND o.amount > 100
fn filtered_join(frame: &ContextFrame) -> CompileResult<(QueryTree, NodeId, [NodeId; 3])> {
    let mut b = TreeBuilder::new(frame);
    let c = b.table(None, "customers", Some("c"))?;
    let o = b.table(None, "orders", Some("o"))?;
    let cid = b.column(Some("c"), "id")?;
    let ocid = b.column(Some("o"), "customer_id")?;
    let join = b.binary(BinaryOperator::Equals, cid, ocid)?;
    let region = b.column(Some("c"), "region")?;
    let eu = b.string("EU")?;
    let by_region = b.binary(BinaryOperator::Equals, region, eu)?;
    let amount = b.column(Some("o"), "amount")?;
    let hundred = b.int(100)?;
    let by_amount = b.binary(BinaryOperator::GreaterThan, amount, hundred)?;
    let where_clause = b.and_all(&[join, by_region, by_amount])?;
    let name = b.column(Some("c"), "name")?;
    let select = b.select(SelectParts {
        columns: vec![(name, None)],
        from: vec![c, o],
        where_clause,
        ..Default::default()
    })?;
    Ok((b.finish(), select, [join, by_region, by_amount]))
}

// SELECT o.id FROM orders o, customers c, regions r
// WHERE o.customer_id = c.id AND c.region = r.code
fn three_way_join(frame: &ContextFrame) -> CompileResult<(QueryTree, NodeId)> {
    let mut b = TreeBuilder::new(frame);
    let o = b.table(None, "orders", Some("o"))?;
    let c = b.table(None, "customers", Some("c"))?;
    let r = b.table(None, "regions", Some("r"))?;
    let ocid = b.column(Some("o"), "customer_id")?;
    let cid = b.column(Some("c"), "id")?;
    let oc = b.binary(BinaryOperator::Equals, ocid, cid)?;
    let cregion = b.column(Some("c"), "region")?;
    let rcode = b.column(Some("r"), "code")?;
    let cr = b.binary(BinaryOperator::Equals, cregion, rcode)?;
    let where_clause = b.and_all(&[oc, cr])?;
    let oid = b.column(Some("o"), "id")?;
    let select = b.select(SelectParts {
        columns: vec![(oid, None)],
        from: vec![o, c, r],
        where_clause,
        ..Default::default()
    })?;
    Ok((b.finish(), select))
}

fn optimize(fixture: &Fixture, cursor: &mut CursorStatement, config: &CompilerConfig) -> CompileResult<()> {
    cursor.optimize(&OptimizeContext { statistics: fixture.statistics.as_ref(), config })
}

fn from_tables(tree: &QueryTree, select: NodeId) -> CompileResult<Vec<NodeId>> {
    Ok(tree.children(tree.child(select, SELECT_FROM_LIST)?)?.to_vec())
}

#[test]
fn test_single_table_predicates_move_under_their_table() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let (tree, select, [join, by_region, by_amount]) = filtered_join(&frame)?;
    let mut cursor = CursorStatement::new(tree, select)?;
    fixture.bind(&frame, &mut cursor)?;
    optimize(&fixture, &mut cursor, &CompilerConfig::default())?;

    let tree = cursor.tree();
    let tables = from_tables(tree, select)?;
    assert_eq!(tree.children(tables[0])?, &[by_region]);
    assert_eq!(tree.children(tables[1])?, &[by_amount]);
    assert_eq!(tree.children(tree.child(select, SELECT_WHERE)?)?, &[join]);

    // CUSTOMERS: 1000 * 0.1, ORDERS: 50000 * 0.33, joined at 0.1
    let cost = cursor.best_cost().expect("optimized");
    assert_eq!(cursor.join_order(), Some(&[0, 1][..]));
    assert_eq!(cost.single_scan_row_count().round(), 16_500.0);
    assert_eq!(cost.estimated_row_count(), 165_000);
    Ok(())
}

#[test]
fn test_pushdown_can_be_disabled() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let (tree, select, conjuncts) = filtered_join(&frame)?;
    let mut cursor = CursorStatement::new(tree, select)?;
    fixture.bind(&frame, &mut cursor)?;
    let config = CompilerConfig { predicate_pushdown: false, ..CompilerConfig::default() };
    optimize(&fixture, &mut cursor, &config)?;

    let tree = cursor.tree();
    for table in from_tables(tree, select)? {
        assert!(tree.children(table)?.is_empty());
    }
    assert_eq!(tree.children(tree.child(select, SELECT_WHERE)?)?, &conjuncts);
    assert!(cursor.join_order().is_some());
    Ok(())
}

#[test]
fn test_small_tables_join_before_large_ones() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let (tree, select) = three_way_join(&frame)?;
    let mut cursor = CursorStatement::new(tree, select)?;
    fixture.bind(&frame, &mut cursor)?;
    optimize(&fixture, &mut cursor, &CompilerConfig::default())?;

    // REGIONS (10 rows), then CUSTOMERS, then ORDERS
    assert_eq!(cursor.join_order(), Some(&[2, 1, 0][..]));
    let NodeKind::Select(node) = cursor.tree().kind(select)? else {
        anyhow::bail!("root is no longer a SELECT");
    };
    assert_eq!(node.join_order.as_deref(), Some(&[2, 1, 0][..]));

    let cost = cursor.best_cost().expect("optimized");
    assert_eq!(cost.cost(), 50_010_010.0);
    assert!(cursor.tree_print().contains("joinOrder: [2, 1, 0]"));
    Ok(())
}

#[test]
fn test_search_limit_keeps_from_order() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let (tree, select) = three_way_join(&frame)?;
    let mut cursor = CursorStatement::new(tree, select)?;
    fixture.bind(&frame, &mut cursor)?;
    let config = CompilerConfig { max_exhaustive_join_tables: 2, ..CompilerConfig::default() };
    optimize(&fixture, &mut cursor, &config)?;

    assert_eq!(cursor.join_order(), Some(&[0, 1, 2][..]));
    Ok(())
}

#[test]
fn test_every_placement_is_costed_once() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let (tree, select) = three_way_join(&frame)?;
    let mut cursor = CursorStatement::new(tree, select)?;
    fixture.bind(&frame, &mut cursor)?;
    let mut tree = cursor.tree().clone();

    let config = CompilerConfig::default();
    let optimizer = JoinOrderOptimizer::new(fixture.statistics.as_ref(), &config);
    let plan = optimizer.optimize_select::<Level2CostEstimate>(&mut tree, select)?;

    // 3 first tables, 6 two-table prefixes, 6 complete orders
    assert_eq!(plan.considered, 15);
    assert_eq!(plan.cost.cost(), 50_010_010.0);
    assert_eq!(plan.order, vec![2, 1, 0]);
    Ok(())
}

#[test]
fn test_optimize_requires_bind() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let (tree, select) = three_way_join(&frame)?;
    let mut cursor = CursorStatement::new(tree, select)?;
    let err = optimize(&fixture, &mut cursor, &CompilerConfig::default()).unwrap_err();
    assert_eq!(err.state().code(), "XJ999");
    assert!(cursor.best_cost().is_none());
    Ok(())
}
