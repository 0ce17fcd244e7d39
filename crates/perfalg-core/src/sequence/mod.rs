//! Sequences: ordered or parallel groups of nodes with a repetition policy and rate.

mod outcome;
pub use outcome::Outcome;

mod pacer;
mod parallel;
mod serial;

use std::{fmt, sync::Arc};

use perfalg_model::{Concurrency, NodeKind, Rate, Repetition, TaskDescriptor};
use tracing::debug;

use crate::{error::ExecError, node::Node, run::RunData, task::NodeMeta};

#[derive(Clone)]
pub struct Sequence {
    label: Option<String>,
    concurrency: Concurrency,
    repetition: Repetition,
    rate: Option<Rate>,
    no_child_report: bool,
    collapsible: bool,
    children: Vec<Node>,
    completed_passes: u64,
    meta: NodeMeta,
}

impl Sequence {
    /// New empty sequence. Unlabeled sequences are collapsible when outermost.
    pub fn new(run: Arc<RunData>, label: Option<String>, concurrency: Concurrency) -> Self {
        let meta = NodeMeta::new(
            run,
            label.as_deref().unwrap_or(concurrency.default_name()),
        );
        Self {
            collapsible: label.is_none(),
            label,
            concurrency,
            repetition: Repetition::default(),
            rate: None,
            no_child_report: false,
            children: Vec::new(),
            completed_passes: 0,
            meta,
        }
    }

    pub fn serial(run: Arc<RunData>) -> Self {
        Self::new(run, None, Concurrency::Serial)
    }

    pub fn parallel(run: Arc<RunData>) -> Self {
        Self::new(run, None, Concurrency::Parallel)
    }

    /// Append a child one level below this sequence.
    pub fn push(&mut self, child: impl Into<Node>) {
        let mut child = child.into();
        child.set_depth(self.meta.depth + 1);
        self.children.push(child);
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[inline]
    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    #[inline]
    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn set_repetition(&mut self, repetition: Repetition) {
        self.repetition = repetition;
    }

    #[inline]
    pub fn rate(&self) -> Option<Rate> {
        self.rate
    }

    pub fn set_rate(&mut self, rate: Rate) {
        self.rate = Some(rate);
    }

    #[inline]
    pub fn no_child_report(&self) -> bool {
        self.no_child_report
    }

    /// Suppress statistics of the children; only this sequence is recorded.
    pub fn set_no_child_report(&mut self) {
        self.no_child_report = true;
    }

    #[inline]
    pub fn is_collapsible(&self) -> bool {
        self.collapsible
    }

    /// Full passes over the children done by the last run.
    #[inline]
    pub fn completed_passes(&self) -> u64 {
        self.completed_passes
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.meta.depth
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.meta.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }

    /// `true` when the sequence is a plain wrapper with nothing that alters execution.
    pub(crate) fn is_plain(&self) -> bool {
        self.repetition.is_once() && self.rate.is_none() && !self.no_child_report
    }

    /// Statistics name: label plus modifier suffixes.
    pub fn name(&self) -> String {
        let mut name = self
            .label
            .as_deref()
            .unwrap_or(self.concurrency.default_name())
            .to_string();
        name.push_str(&self.repetition.name_suffix());
        if let Some(rate) = self.rate {
            name.push_str(&format!("_{rate}"));
        }
        if self.concurrency.is_parallel() && !name.to_lowercase().contains("par") {
            name.push_str("_Par");
        }
        name
    }

    /// Run once, recording this sequence in statistics when `reporting` is set.
    pub async fn run(&mut self, reporting: bool) -> Result<Outcome, ExecError> {
        let name = self.name();
        if reporting {
            self.meta.log_start(&name);
        }

        let run = Arc::clone(&self.meta.run);
        let handle = reporting.then(|| run.stats().mark_start(&name, run.config().round()));
        let child_report = reporting && !self.no_child_report;

        let result = if self.children.is_empty() {
            Ok(Outcome::default())
        } else if self.concurrency.is_parallel() {
            self.run_parallel(&name, child_report).await
        } else {
            self.run_serial(child_report).await
        };

        if let (Some(h), Ok(outcome)) = (handle, &result) {
            run.stats().mark_end(h, outcome.count);
        }
        self.meta.tick(&name, |n| format!("processed {n} records"));

        if let Ok(outcome) = &result {
            debug!(
                sequence = %name,
                count = outcome.count,
                exhausted = outcome.exhausted,
                passes = self.completed_passes,
                "sequence completed"
            );
        }
        result
    }

    /// Close every child, then the bound content source. Idempotent.
    pub fn close(&mut self) {
        if self.meta.closed {
            return;
        }
        self.meta.closed = true;
        for child in &mut self.children {
            child.close();
        }
        self.meta.run.close_sources();
    }

    pub(crate) fn describe_into(&self, out: &mut Vec<TaskDescriptor>) {
        out.push(TaskDescriptor {
            name: self.name(),
            depth: self.meta.depth,
            kind: NodeKind::Sequence,
        });
        for child in &self.children {
            child.describe_into(out);
        }
    }

    pub(crate) fn write_tree(&self, out: &mut String, indent: usize) {
        let pad = "    ".repeat(indent);
        out.push_str(&format!("{pad}{} {}", self.concurrency.open(), self.name()));
        if self.no_child_report {
            out.push_str(" (no child report)");
        }
        out.push('\n');

        for child in &self.children {
            child.write_tree(out, indent + 1);
        }

        out.push_str(&format!("{pad}{}", self.concurrency.close()));
        match self.repetition {
            Repetition::Count(1) => {}
            Repetition::Count(n) => out.push_str(&format!(" * {n}")),
            Repetition::UntilExhausted => out.push_str(" * EXHAUST"),
            Repetition::For(_) => {
                let g = self.repetition.grammar();
                out.push_str(&format!(" * {}", g.trim_start_matches(':')));
            }
        }
        if let Some(rate) = self.rate {
            out.push_str(&format!(" @ {rate}"));
        }
        out.push('\n');
    }
}

impl fmt::Display for Sequence {
    /// Canonical grammar text, e.g. `{ "label" A B(x) -C }:3::10/min>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.concurrency.open()))?;
        if let Some(label) = &self.label {
            write!(f, " \"{label}\"")?;
        }
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, " {}", self.concurrency.close())?;

        // A rate needs an explicit repetition in front of it.
        if self.rate.is_some() && self.repetition.is_once() {
            f.write_str(":1")?;
        } else {
            f.write_str(&self.repetition.grammar())?;
        }
        if let Some(rate) = self.rate {
            write!(f, "::{rate}")?;
        }
        if self.no_child_report {
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name())
            .field("depth", &self.meta.depth)
            .field("concurrency", &self.concurrency)
            .field("repetition", &self.repetition)
            .field("rate", &self.rate)
            .field("children", &self.children)
            .finish()
    }
}
