// Query Tree Arena
//
// Nodes live in a `Vec` owned by the tree and are addressed by `NodeId`.
// Parents refer to children by id, one id per child slot. Replacing a child
// rebinds the slot; it never compares node contents, so two structurally
// equal nodes stay distinct. The same id may sit in several slots when a
// subtree is shared.

use crate::common::types::Span;
use crate::common::{CompileError, CompileResult, ContextId, NodeId};
use crate::query::context::ContextFrame;
use crate::query::tree::node::{Node, NodeKind};

/// Arena holding every node of one statement
#[derive(Debug, Clone)]
pub struct QueryTree {
    context: ContextId,
    nodes: Vec<Node>,
}

impl QueryTree {
    /// Create an empty tree bound to a live compilation context
    pub fn new(frame: &ContextFrame) -> Self {
        QueryTree {
            context: frame.id(),
            nodes: Vec::new(),
        }
    }

    /// Context every node of this tree was created under
    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Allocate a node with the given children
    pub fn add(
        &mut self,
        frame: &ContextFrame,
        kind: NodeKind,
        children: Vec<NodeId>,
    ) -> CompileResult<NodeId> {
        self.add_with_span(frame, kind, children, None)
    }

    /// Allocate a node and record its source offsets
    pub fn add_with_span(
        &mut self,
        frame: &ContextFrame,
        kind: NodeKind,
        children: Vec<NodeId>,
        span: Option<Span>,
    ) -> CompileResult<NodeId> {
        if frame.id() != self.context {
            return Err(CompileError::internal(format!(
                "{} created under {} cannot join a tree owned by {}",
                kind.node_name(),
                frame.id(),
                self.context
            )));
        }
        for child in &children {
            self.check(*child)?;
        }

        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            children,
            context: frame.id(),
            span,
            type_desc: None,
        });
        Ok(id)
    }

    fn check(&self, id: NodeId) -> CompileResult<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(CompileError::internal(format!("{} does not belong to this tree", id)))
        }
    }

    pub fn node(&self, id: NodeId) -> CompileResult<&Node> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| CompileError::internal(format!("{} does not belong to this tree", id)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> CompileResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| CompileError::internal(format!("{} does not belong to this tree", id)))
    }

    pub fn kind(&self, id: NodeId) -> CompileResult<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> CompileResult<&mut NodeKind> {
        Ok(&mut self.node_mut(id)?.kind)
    }

    pub fn children(&self, id: NodeId) -> CompileResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Child in a given slot
    pub fn child(&self, parent: NodeId, slot: usize) -> CompileResult<NodeId> {
        let node = self.node(parent)?;
        node.children.get(slot).copied().ok_or_else(|| {
            CompileError::internal(format!(
                "{} ({}) has no child slot {}",
                parent,
                node.kind.node_name(),
                slot
            ))
        })
    }

    /// Whether `target` is `from` or lies anywhere beneath it
    pub fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut pending = vec![from];
        while let Some(id) = pending.pop() {
            if id == target {
                return true;
            }
            let Some(node) = self.nodes.get(id.index()) else {
                continue;
            };
            if !std::mem::replace(&mut seen[id.index()], true) {
                pending.extend(node.children.iter().copied());
            }
        }
        false
    }

    fn check_acyclic(&self, parent: NodeId, child: NodeId) -> CompileResult<()> {
        if self.reaches(child, parent) {
            return Err(CompileError::internal(format!(
                "attaching {} under {} would create a cycle",
                child, parent
            )));
        }
        Ok(())
    }

    /// Rebind a child slot, returning the id it held before
    pub fn set_child(&mut self, parent: NodeId, slot: usize, child: NodeId) -> CompileResult<NodeId> {
        self.check(child)?;
        let previous = self.child(parent, slot)?;
        if previous == child {
            return Ok(previous);
        }
        self.check_acyclic(parent, child)?;
        self.nodes[parent.index()].children[slot] = child;
        Ok(previous)
    }

    /// Append a child slot
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> CompileResult<()> {
        self.check(child)?;
        self.check(parent)?;
        self.check_acyclic(parent, child)?;
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Remove a child slot, shifting later slots down
    pub fn remove_child(&mut self, parent: NodeId, slot: usize) -> CompileResult<NodeId> {
        let removed = self.child(parent, slot)?;
        self.nodes[parent.index()].children.remove(slot);
        Ok(removed)
    }

    /// Type assigned to an expression node by bind
    pub fn type_of(&self, id: NodeId) -> CompileResult<Option<&crate::catalog::TypeDescriptor>> {
        Ok(self.node(id)?.type_desc.as_ref())
    }

    /// Whether two subtrees have equal payloads and equal shapes.
    ///
    /// This is the comparison used to detect equivalent clauses; it is never
    /// used to decide node identity.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        let (Some(left), Some(right)) = (self.nodes.get(a.index()), self.nodes.get(b.index())) else {
            return false;
        };
        left.kind == right.kind
            && left.children.len() == right.children.len()
            && left
                .children
                .iter()
                .zip(right.children.iter())
                .all(|(l, r)| self.structurally_equal(*l, *r))
    }

    /// Ids of every node reachable from `root`, in pre-order, shared nodes once
    pub fn reachable(&self, root: NodeId) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(node) = self.nodes.get(id.index()) else {
                continue;
            };
            if seen[id.index()] {
                continue;
            }
            seen[id.index()] = true;
            order.push(id);
            pending.extend(node.children.iter().rev().copied());
        }
        order
    }
}
