use serde::{Deserialize, Serialize};

/// Kind of a node in a parsed algorithm tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A leaf operation resolved through the task registry.
    Task,
    /// A serial or parallel grouping of nodes.
    Sequence,
}

impl NodeKind {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeKind::Task => "task",
            NodeKind::Sequence => "sequence",
        }
    }
}
