use serde::{Deserialize, Serialize};

use crate::NodeKind;

/// Flat description of one node of a parsed algorithm, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    /// Display name, including parameters or sequence modifiers.
    pub name: String,
    /// Nesting depth; the root is at depth 0.
    pub depth: usize,
    pub kind: NodeKind,
}
