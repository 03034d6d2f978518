// Window Definitions
//
// A window clause is either written out (a definition, possibly inline in a
// window function call) or names a definition from the WINDOW clause (a
// reference). Both appear as tree nodes.

use std::fmt;

use crate::common::NodeId;

/// Name given to window definitions written inline in a function call
pub const INLINE_WINDOW_NAME: &str = "IN-LINE";

/// An explicit window specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDefinition {
    name: String,
    inlined: bool,
}

impl WindowDefinition {
    /// `name` is `None` for a definition written inline in a function call
    pub fn new(name: Option<&str>) -> Self {
        match name {
            Some(name) => WindowDefinition { name: name.to_uppercase(), inlined: false },
            None => WindowDefinition { name: INLINE_WINDOW_NAME.to_string(), inlined: true },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_inlined(&self) -> bool {
        self.inlined
    }
}

impl fmt::Display for WindowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "definition: {}", self.name)
    }
}

/// A reference to a window defined in the WINDOW clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowReference {
    name: String,
    /// Definition node this reference resolved to, set by bind
    resolved: Option<NodeId>,
}

impl WindowReference {
    pub fn new(name: &str) -> Self {
        WindowReference { name: name.to_uppercase(), resolved: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolved(&self) -> Option<NodeId> {
        self.resolved
    }

    pub(crate) fn resolve_to(&mut self, definition: NodeId) {
        self.resolved = Some(definition);
    }
}

impl fmt::Display for WindowReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "referenced window: {}", self.name)
    }
}
