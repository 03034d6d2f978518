// Tree Printing
//
// Debug rendering of a query tree: one line per node, indented by one tab per
// level, with the sub-nodes of a SELECT labelled by clause.

use std::fmt::Write;

use crate::common::NodeId;
use crate::query::tree::arena::QueryTree;
use crate::query::tree::node::{
    NodeKind, SELECT_FROM_LIST, SELECT_GROUP_BY, SELECT_RESULT_COLUMNS, SELECT_WHERE,
    SELECT_WINDOWS, WINDOW_ORDER, WINDOW_PARTITION,
};

fn slot_label(kind: &NodeKind, slot: usize) -> Option<&'static str> {
    match kind {
        NodeKind::Select(_) => match slot {
            SELECT_RESULT_COLUMNS => Some("resultColumns"),
            SELECT_FROM_LIST => Some("fromList"),
            SELECT_WHERE => Some("whereClause"),
            SELECT_GROUP_BY => Some("groupByList"),
            SELECT_WINDOWS => Some("windows"),
            _ => None,
        },
        NodeKind::WindowDefinition(_) => match slot {
            WINDOW_PARTITION => Some("partition"),
            WINDOW_ORDER => Some("orderby"),
            _ => None,
        },
        NodeKind::FromBaseTable(_) => Some("restriction"),
        _ => None,
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

impl QueryTree {
    /// Render the subtree under `root` for diagnostics
    pub fn tree_print(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.print_node(root, 0, &mut out);
        out
    }

    fn print_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Ok(node) = self.node(id) else {
            indent(out, depth);
            let _ = writeln!(out, "<dangling {}>", id);
            return;
        };

        indent(out, depth);
        let _ = write!(out, "{}", node.kind());
        if let Some(ty) = node.type_desc() {
            let _ = write!(out, " type: {}", ty);
        }
        out.push('\n');

        for (slot, child) in node.children().iter().enumerate() {
            match slot_label(node.kind(), slot) {
                Some(label) => {
                    indent(out, depth + 1);
                    let _ = writeln!(out, "{}:", label);
                    self.print_node(*child, depth + 2, out);
                }
                None => self.print_node(*child, depth + 1, out),
            }
        }
    }
}
