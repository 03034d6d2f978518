// Node Substitution Visitor
//
// Replaces every occurrence of one node, by id, with another node.

use log::trace;

use crate::common::{CompileResult, NodeId};
use crate::query::tree::QueryTree;
use crate::query::visitor::Visitor;

#[derive(Debug)]
pub struct ReplaceNodeVisitor {
    target: NodeId,
    replacement: NodeId,
    replaced: usize,
}

impl ReplaceNodeVisitor {
    pub fn new(target: NodeId, replacement: NodeId) -> Self {
        ReplaceNodeVisitor { target, replacement, replaced: 0 }
    }

    /// Number of slots rebound so far
    pub fn replaced(&self) -> usize {
        self.replaced
    }
}

impl Visitor for ReplaceNodeVisitor {
    fn visit(&mut self, _tree: &mut QueryTree, node: NodeId) -> CompileResult<NodeId> {
        if node == self.target {
            trace!("Replacing {} with {}", self.target, self.replacement);
            self.replaced += 1;
            Ok(self.replacement)
        } else {
            Ok(node)
        }
    }
}
