use std::{fmt, future::Future, pin::Pin};

use perfalg_model::{NodeKind, TaskDescriptor};

use crate::{
    error::ExecError,
    sequence::{Outcome, Sequence},
    task::TaskNode,
};

/// Boxed future used to recurse through the tree.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A node of the algorithm tree.
#[derive(Clone, Debug)]
pub enum Node {
    Task(TaskNode),
    Sequence(Sequence),
}

impl Node {
    /// Statistics name of the node.
    pub fn name(&self) -> String {
        match self {
            Node::Task(t) => t.name(),
            Node::Sequence(s) => s.name(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Task(t) => t.depth(),
            Node::Sequence(s) => s.depth(),
        }
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        match self {
            Node::Task(t) => t.set_depth(depth),
            Node::Sequence(s) => s.set_depth(depth),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Task(_) => NodeKind::Task,
            Node::Sequence(_) => NodeKind::Sequence,
        }
    }

    pub fn as_task(&self) -> Option<&TaskNode> {
        match self {
            Node::Task(t) => Some(t),
            Node::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(s) => Some(s),
            Node::Task(_) => None,
        }
    }

    pub(crate) fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Node::Sequence(s) => Some(s),
            Node::Task(_) => None,
        }
    }

    /// Run the node once, recording statistics when `reporting` is set.
    pub fn run(&mut self, reporting: bool) -> BoxFuture<'_, Result<Outcome, ExecError>> {
        Box::pin(async move {
            match self {
                Node::Task(t) => t.run(reporting).await,
                Node::Sequence(s) => s.run(reporting).await,
            }
        })
    }

    pub fn close(&mut self) {
        match self {
            Node::Task(t) => t.close(),
            Node::Sequence(s) => s.close(),
        }
    }

    /// Pre-order listing of this node and everything below it.
    pub(crate) fn describe_into(&self, out: &mut Vec<TaskDescriptor>) {
        match self {
            Node::Task(t) => out.push(TaskDescriptor {
                name: t.name(),
                depth: t.depth(),
                kind: NodeKind::Task,
            }),
            Node::Sequence(s) => s.describe_into(out),
        }
    }

    pub(crate) fn write_tree(&self, out: &mut String, indent: usize) {
        match self {
            Node::Task(t) => {
                out.push_str(&"    ".repeat(indent));
                out.push_str(&t.to_string());
                out.push('\n');
            }
            Node::Sequence(s) => s.write_tree(out, indent),
        }
    }
}

impl From<TaskNode> for Node {
    fn from(t: TaskNode) -> Self {
        Node::Task(t)
    }
}

impl From<Sequence> for Node {
    fn from(s: Sequence) -> Self {
        Node::Sequence(s)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Task(t) => t.fmt(f),
            Node::Sequence(s) => s.fmt(f),
        }
    }
}
