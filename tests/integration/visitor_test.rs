use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sqlforge::common::{CompileResult, NodeId};
use sqlforge::query::context::ContextManager;
use sqlforge::query::tree::{BinaryOperator, Literal, NodeKind, QueryTree, TreeBuilder};
use sqlforge::query::visitor::{
    traverse, CollectNodesVisitor, HasNodeVisitor, ReplaceNodeVisitor, Visitor,
};

// Replacement visitor that also counts visits
struct CountingReplace {
    inner: ReplaceNodeVisitor,
    visits: usize,
}

impl Visitor for CountingReplace {
    fn visit(&mut self, tree: &mut QueryTree, node: NodeId) -> CompileResult<NodeId> {
        self.visits += 1;
        self.inner.visit(tree, node)
    }
}

// Records visits, optionally stopping after a given node or skipping below one
struct Probe {
    visited: Vec<NodeId>,
    stop_after: Option<NodeId>,
    skip_below: Option<NodeId>,
    post_order: bool,
}

impl Probe {
    fn new() -> Self {
        Probe { visited: Vec::new(), stop_after: None, skip_below: None, post_order: false }
    }
}

impl Visitor for Probe {
    fn visit(&mut self, _tree: &mut QueryTree, node: NodeId) -> CompileResult<NodeId> {
        self.visited.push(node);
        Ok(node)
    }

    fn visit_children_first(&self, _tree: &QueryTree, _node: NodeId) -> bool {
        self.post_order
    }

    fn skip_children(&mut self, _tree: &QueryTree, node: NodeId) -> CompileResult<bool> {
        Ok(self.skip_below == Some(node))
    }

    fn stop_traversal(&self) -> bool {
        match (self.stop_after, self.visited.last()) {
            (Some(stop), Some(last)) => stop == *last,
            _ => false,
        }
    }
}

#[test]
fn test_three_node_substitution() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let child1 = b.int(1)?;
    let child2 = b.int(2)?;
    let root = b.binary(BinaryOperator::Plus, child1, child2)?;
    let new_leaf = b.int(10)?;
    let mut tree = b.finish();

    let mut v = CountingReplace { inner: ReplaceNodeVisitor::new(child1, new_leaf), visits: 0 };
    let result = traverse(&mut tree, root, &mut v)?;

    assert_eq!(result, root);
    assert_eq!(tree.children(root)?, &[new_leaf, child2]);
    assert_eq!(v.visits, 3);
    assert_eq!(v.inner.replaced(), 1);
    Ok(())
}

#[test]
fn test_root_replacement_is_returned() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let l = b.int(1)?;
    let r = b.int(2)?;
    let root = b.binary(BinaryOperator::Plus, l, r)?;
    let other = b.int(3)?;
    let mut tree = b.finish();

    let mut v = ReplaceNodeVisitor::new(root, other);
    assert_eq!(traverse(&mut tree, root, &mut v)?, other);
    // The original root's children are still walked and left alone
    assert_eq!(tree.children(root)?, &[l, r]);
    Ok(())
}

#[test]
fn test_shared_subtree_replaced_everywhere() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let shared = b.column(None, "a")?;
    let twin = b.column(None, "a")?;
    let c = b.int(4)?;
    let inner = b.binary(BinaryOperator::Equals, shared, c)?;
    let root = b.add(NodeKind::PredicateList, vec![shared, inner, twin])?;
    let replacement = b.int(99)?;
    let mut tree = b.finish();

    let mut v = ReplaceNodeVisitor::new(shared, replacement);
    traverse(&mut tree, root, &mut v)?;

    assert_eq!(tree.children(root)?, &[replacement, inner, twin]);
    assert_eq!(tree.children(inner)?, &[replacement, c]);
    assert_eq!(v.replaced(), 2);

    assert!(tree.reachable(root).iter().all(|id| *id != shared));

    let mut finder = HasNodeVisitor::new(|k| *k == NodeKind::Constant(Literal::Integer(99)));
    traverse(&mut tree, root, &mut finder)?;
    assert_eq!(finder.found(), Some(replacement));
    Ok(())
}

#[test]
fn test_early_stop_in_pre_order() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let a = b.int(1)?;
    let bb = b.int(2)?;
    let left = b.binary(BinaryOperator::Plus, a, bb)?;
    let c = b.int(3)?;
    let root = b.binary(BinaryOperator::Times, left, c)?;
    let mut tree = b.finish();

    let mut probe = Probe::new();
    probe.stop_after = Some(a);
    traverse(&mut tree, root, &mut probe)?;
    assert_eq!(probe.visited, vec![root, left, a]);
    Ok(())
}

#[test]
fn test_early_stop_in_post_order() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let a = b.int(1)?;
    let bb = b.int(2)?;
    let left = b.binary(BinaryOperator::Plus, a, bb)?;
    let c = b.int(3)?;
    let root = b.binary(BinaryOperator::Times, left, c)?;
    let mut tree = b.finish();

    let mut probe = Probe::new();
    probe.post_order = true;
    probe.stop_after = Some(left);
    traverse(&mut tree, root, &mut probe)?;
    assert_eq!(probe.visited, vec![a, bb, left]);
    Ok(())
}

#[test]
fn test_skip_children_visits_siblings() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let a = b.int(1)?;
    let bb = b.int(2)?;
    let left = b.binary(BinaryOperator::Plus, a, bb)?;
    let c = b.int(3)?;
    let root = b.binary(BinaryOperator::Times, left, c)?;
    let mut tree = b.finish();

    for post_order in [false, true] {
        let mut probe = Probe::new();
        probe.skip_below = Some(left);
        probe.post_order = post_order;
        traverse(&mut tree, root, &mut probe)?;
        assert!(probe.visited.contains(&left));
        assert!(probe.visited.contains(&c));
        assert!(!probe.visited.contains(&a));
        assert!(!probe.visited.contains(&bb));
    }
    Ok(())
}

#[test]
fn test_collect_in_visit_order() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    let mut b = TreeBuilder::new(&frame);
    let x = b.column(None, "x")?;
    let one = b.int(1)?;
    let eq = b.binary(BinaryOperator::Equals, x, one)?;
    let y = b.column(Some("t"), "y")?;
    let root = b.binary(BinaryOperator::Plus, eq, y)?;
    let mut tree = b.finish();

    let mut v = CollectNodesVisitor::new(|k| matches!(k, NodeKind::ColumnReference(_)));
    traverse(&mut tree, root, &mut v)?;
    assert_eq!(v.collected(), &[x, y]);
    Ok(())
}

// Random DAG built bottom-up: leaves are constants, inner nodes pick random
// earlier nodes as children, so subtrees are frequently shared.
fn random_tree(rng: &mut StdRng, frame: &sqlforge::ContextFrame) -> Result<(QueryTree, NodeId)> {
    let mut tree = QueryTree::new(frame);
    let mut pool = Vec::new();
    for i in 0..rng.gen_range(3..8) {
        pool.push(tree.add(frame, NodeKind::Constant(Literal::Integer(i)), vec![])?);
    }
    for _ in 0..rng.gen_range(3..8) {
        let arity = rng.gen_range(1..3);
        let children = (0..arity).map(|_| pool[rng.gen_range(0..pool.len())]).collect();
        pool.push(tree.add(frame, NodeKind::PredicateList, children)?);
    }
    let root = tree.add(frame, NodeKind::PredicateList, pool.clone())?;
    Ok((tree, root))
}

#[test]
fn test_randomized_substitution_property() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let contexts = ContextManager::new();

    for _ in 0..50 {
        let frame = contexts.push("APP");
        let (mut tree, root) = random_tree(&mut rng, &frame)?;
        let reachable = tree.reachable(root);
        let target = reachable[rng.gen_range(1..reachable.len())];
        let replacement = tree.add(&frame, NodeKind::Constant(Literal::Integer(-1)), vec![])?;

        let mut expected_slots = 0;
        let mut untouched = Vec::new();
        for id in &reachable {
            for (slot, child) in tree.children(*id)?.iter().enumerate() {
                if *child == target {
                    expected_slots += 1;
                } else {
                    untouched.push((*id, slot, *child));
                }
            }
        }

        let mut v = ReplaceNodeVisitor::new(target, replacement);
        assert_eq!(traverse(&mut tree, root, &mut v)?, root);
        assert_eq!(v.replaced(), expected_slots);

        for id in tree.reachable(root) {
            assert_ne!(id, target);
        }
        for (parent, slot, child) in untouched {
            assert_eq!(tree.child(parent, slot)?, child);
        }
    }
    Ok(())
}
