// Trigger Referencing Clause
//
// `REFERENCING { OLD | NEW } [ ROW | TABLE ] AS identifier` entries of a
// CREATE TRIGGER statement.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerReferencing {
    pub identifier: String,
    /// Row granularity when true, table granularity otherwise
    pub is_row: bool,
    /// New image when true, old image otherwise
    pub is_new: bool,
}

impl TriggerReferencing {
    pub fn new(identifier: &str, is_row: bool, is_new: bool) -> Self {
        TriggerReferencing {
            identifier: identifier.to_uppercase(),
            is_row,
            is_new,
        }
    }
}

impl fmt::Display for TriggerReferencing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            if self.is_row { "ROW" } else { "TABLE" },
            if self.is_new { "new" } else { "old" },
            self.identifier
        )
    }
}
