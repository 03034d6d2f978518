// Common Identifier Types
//
// Strongly typed identifiers for tree nodes and compilation context frames.
// Raw integers are never used for identity outside this module.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! new_id {
    ($name:ident, $label:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(v: u32) -> Self {
                Self(v)
            }

            pub const fn get(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

// Slot index of a node inside its owning `QueryTree` arena. Two nodes are the
// same node exactly when their ids are equal.
new_id!(NodeId, "node");

// Identity of one frame on the compilation context stack.
new_id!(ContextId, "ctx");

/// Byte offsets of a node's text in the original statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Span { begin, end }
    }
}
