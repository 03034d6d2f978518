// Collecting Visitors
//
// Read-only visitors that gather the ids of nodes matching a predicate, or
// report whether any such node exists.

use crate::common::{CompileResult, NodeId};
use crate::query::tree::{NodeKind, QueryTree};
use crate::query::visitor::Visitor;

type KindPredicate = Box<dyn Fn(&NodeKind) -> bool>;

/// Collects every node whose kind matches, in visit order
pub struct CollectNodesVisitor {
    matches: KindPredicate,
    skip_over: Option<KindPredicate>,
    collected: Vec<NodeId>,
}

impl CollectNodesVisitor {
    pub fn new(matches: impl Fn(&NodeKind) -> bool + 'static) -> Self {
        CollectNodesVisitor { matches: Box::new(matches), skip_over: None, collected: Vec::new() }
    }

    /// Do not descend below nodes of the given shape
    pub fn skipping(mut self, skip_over: impl Fn(&NodeKind) -> bool + 'static) -> Self {
        self.skip_over = Some(Box::new(skip_over));
        self
    }

    pub fn collected(&self) -> &[NodeId] {
        &self.collected
    }

    pub fn into_collected(self) -> Vec<NodeId> {
        self.collected
    }
}

impl Visitor for CollectNodesVisitor {
    fn visit(&mut self, tree: &mut QueryTree, node: NodeId) -> CompileResult<NodeId> {
        if (self.matches)(tree.kind(node)?) {
            self.collected.push(node);
        }
        Ok(node)
    }

    fn skip_children(&mut self, tree: &QueryTree, node: NodeId) -> CompileResult<bool> {
        match &self.skip_over {
            Some(skip) => Ok(skip(tree.kind(node)?)),
            None => Ok(false),
        }
    }
}

/// Stops at the first node whose kind matches
pub struct HasNodeVisitor {
    matches: KindPredicate,
    found: Option<NodeId>,
}

impl HasNodeVisitor {
    pub fn new(matches: impl Fn(&NodeKind) -> bool + 'static) -> Self {
        HasNodeVisitor { matches: Box::new(matches), found: None }
    }

    pub fn found(&self) -> Option<NodeId> {
        self.found
    }

    pub fn has_node(&self) -> bool {
        self.found.is_some()
    }
}

impl Visitor for HasNodeVisitor {
    fn visit(&mut self, tree: &mut QueryTree, node: NodeId) -> CompileResult<NodeId> {
        if (self.matches)(tree.kind(node)?) {
            self.found = Some(node);
        }
        Ok(node)
    }

    fn stop_traversal(&self) -> bool {
        self.found.is_some()
    }
}
