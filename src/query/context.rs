// Compilation Context Stack
//
// The session owns a `ContextManager`; entering a compilation unit pushes a
// frame and leaving it (normally, on error, or on unwind) pops it. Tree nodes
// can only be created through a live `ContextFrame`, so every node records
// the frame it was created under.

use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::common::ContextId;

#[derive(Debug)]
struct FrameState {
    id: ContextId,
    default_schema: String,
}

#[derive(Debug, Default)]
struct StackState {
    frames: Vec<FrameState>,
    next_id: u32,
}

/// Scoped stack of compilation contexts for one session
#[derive(Debug, Clone, Default)]
pub struct ContextManager {
    stack: Arc<Mutex<StackState>>,
}

impl ContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a compilation unit. The returned guard pops the frame when dropped.
    pub fn push(&self, default_schema: &str) -> ContextFrame {
        let mut stack = self.stack.lock();
        stack.next_id += 1;
        let id = ContextId::new(stack.next_id);
        let default_schema = default_schema.to_uppercase();
        stack.frames.push(FrameState { id, default_schema: default_schema.clone() });
        debug!("Pushed compilation context {} (depth {})", id, stack.frames.len());

        ContextFrame {
            id,
            default_schema,
            stack: Arc::clone(&self.stack),
        }
    }

    /// Number of live frames
    pub fn depth(&self) -> usize {
        self.stack.lock().frames.len()
    }

    /// Id of the innermost live frame
    pub fn current(&self) -> Option<ContextId> {
        self.stack.lock().frames.last().map(|f| f.id)
    }

    pub fn is_live(&self, id: ContextId) -> bool {
        self.stack.lock().frames.iter().any(|f| f.id == id)
    }

    /// Default schema of a live frame
    pub fn default_schema(&self, id: ContextId) -> Option<String> {
        self.stack
            .lock()
            .frames
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.default_schema.clone())
    }
}

/// A live frame on the context stack.
///
/// Holding a `&ContextFrame` proves the frame is live; node constructors take
/// one for that reason.
#[derive(Debug)]
pub struct ContextFrame {
    id: ContextId,
    default_schema: String,
    stack: Arc<Mutex<StackState>>,
}

impl ContextFrame {
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Schema used for unqualified names compiled under this frame
    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Whether this frame is the innermost one on its stack
    pub fn is_current(&self) -> bool {
        self.stack.lock().frames.last().map(|f| f.id) == Some(self.id)
    }
}

impl Drop for ContextFrame {
    fn drop(&mut self) {
        let mut stack = self.stack.lock();
        match stack.frames.iter().rposition(|f| f.id == self.id) {
            Some(pos) => {
                if pos + 1 != stack.frames.len() {
                    warn!(
                        "Compilation context {} popped while {} inner frame(s) are live",
                        self.id,
                        stack.frames.len() - pos - 1
                    );
                }
                stack.frames.remove(pos);
                debug!("Popped compilation context {} (depth {})", self.id, stack.frames.len());
            }
            None => warn!("Compilation context {} was already popped", self.id),
        }
    }
}
