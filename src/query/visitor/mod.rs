//! Visitor Engine
//!
//! One traversal algorithm over a `QueryTree`, driven by a caller-supplied
//! `Visitor`. At each node:
//!
//! 1. ask `visit_children_first` and `skip_children`;
//! 2. in post-order, walk the children (unless skipped or stopped);
//! 3. `visit` the node, unless traversal was stopped;
//! 4. in pre-order, walk the children of the original node (unless skipped
//!    or stopped).
//!
//! Whatever `visit` returns is written back into the parent's child slot by
//! position. The replacement is not visited in the same pass. Failures
//! propagate unchanged and leave substitutions already applied in place.

pub mod collect;
pub mod replace;

pub use self::collect::{CollectNodesVisitor, HasNodeVisitor};
pub use self::replace::ReplaceNodeVisitor;

use crate::common::{CompileResult, NodeId};
use crate::query::tree::QueryTree;

/// Capability object driving a traversal
pub trait Visitor {
    /// Inspect `node` and return the node that should occupy its slot
    fn visit(&mut self, tree: &mut QueryTree, node: NodeId) -> CompileResult<NodeId>;

    /// Visit this node after its children instead of before
    fn visit_children_first(&self, _tree: &QueryTree, _node: NodeId) -> bool {
        false
    }

    /// Do not descend into this node's children in this pass
    fn skip_children(&mut self, _tree: &QueryTree, _node: NodeId) -> CompileResult<bool> {
        Ok(false)
    }

    /// Checked after every visit and before each child
    fn stop_traversal(&self) -> bool {
        false
    }
}

/// Walk the subtree under `root` and return the (possibly replaced) root
pub fn traverse<V: Visitor + ?Sized>(
    tree: &mut QueryTree,
    root: NodeId,
    visitor: &mut V,
) -> CompileResult<NodeId> {
    accept(tree, root, visitor)
}

fn accept<V: Visitor + ?Sized>(
    tree: &mut QueryTree,
    node: NodeId,
    visitor: &mut V,
) -> CompileResult<NodeId> {
    let children_first = visitor.visit_children_first(tree, node);
    let skip = visitor.skip_children(tree, node)?;

    if children_first && !skip && !visitor.stop_traversal() {
        accept_children(tree, node, visitor)?;
    }

    let result = if visitor.stop_traversal() {
        node
    } else {
        visitor.visit(tree, node)?
    };

    if !children_first && !skip && !visitor.stop_traversal() {
        accept_children(tree, node, visitor)?;
    }

    Ok(result)
}

fn accept_children<V: Visitor + ?Sized>(
    tree: &mut QueryTree,
    parent: NodeId,
    visitor: &mut V,
) -> CompileResult<()> {
    // Slots are re-read on each step; a visit may rewrite earlier siblings.
    let mut slot = 0;
    while slot < tree.children(parent)?.len() {
        if visitor.stop_traversal() {
            break;
        }
        let child = tree.child(parent, slot)?;
        let replacement = accept(tree, child, visitor)?;
        if replacement != child {
            tree.set_child(parent, slot, replacement)?;
        }
        slot += 1;
    }
    Ok(())
}
