//! Statistics collector.
//!
//! One [`Entry`] per recorded task invocation. The invocation counter and the entry list
//! live under one mutex, so concurrent `mark_start`/`mark_end` calls never lose an entry
//! or hand out the same run number twice.

mod entry;
pub use entry::{Entry, EntryHandle};

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use perfalg_model::{Report, Round, StatsRow};
use tracing::trace;

use crate::{config::Config, memory};

#[derive(Default)]
pub struct Stats {
    inner: Mutex<StatsInner>,
}

#[derive(Default)]
struct StatsInner {
    next_run: u64,
    generation: u64,
    entries: Vec<Entry>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new entry for `name` in `round`.
    pub fn mark_start(&self, name: &str, round: Round) -> EntryHandle {
        let mem = memory::sample();
        let mut inner = self.lock();

        let run_num = inner.next_run;
        inner.next_run += 1;
        let slot = inner.entries.len();
        inner.entries.push(Entry {
            name: name.to_string(),
            run_num,
            round,
            started_at: Instant::now(),
            elapsed: None,
            count: 0,
            parallelism: 0,
            mem,
        });
        trace!(task = name, run_num, round, "stats: mark start");

        EntryHandle {
            slot,
            run_num,
            generation: inner.generation,
        }
    }

    /// Complete an entry with the number of work items done.
    ///
    /// A handle from before the last [`Stats::clear`] is ignored.
    pub fn mark_end(&self, handle: EntryHandle, count: u64) {
        let mem = memory::sample();
        let mut inner = self.lock();
        if handle.generation != inner.generation {
            return;
        }

        let next_run = inner.next_run;
        let Some(entry) = inner.entries.get_mut(handle.slot) else {
            return;
        };
        if entry.run_num != handle.run_num || entry.elapsed.is_some() {
            return;
        }
        entry.elapsed = Some(entry.started_at.elapsed());
        entry.count = count;
        entry.parallelism = next_run - 1 - entry.run_num;
        entry.mem = entry.mem.max(mem);
        trace!(
            task = %entry.name,
            run_num = entry.run_num,
            count,
            parallelism = entry.parallelism,
            "stats: mark end"
        );
    }

    /// Drop every entry. The run counter keeps counting.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.generation += 1;
    }

    /// Snapshot of all entries, completed or not.
    pub fn entries(&self) -> Vec<Entry> {
        self.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One row per distinct name.
    pub fn by_name(&self) -> Report {
        self.aggregate(|_| true, |e| e.name.clone())
    }

    /// One row per distinct `(round, name)`.
    pub fn by_name_round(&self) -> Report {
        self.aggregate(|_| true, |e| (e.round, e.name.clone()))
    }

    /// One row per distinct name among names starting with `prefix`.
    pub fn by_prefix(&self, prefix: &str) -> Report {
        self.aggregate(|e| e.name.starts_with(prefix), |e| e.name.clone())
    }

    /// One row per distinct `(round, name)` among names starting with `prefix`.
    pub fn by_prefix_round(&self, prefix: &str) -> Report {
        self.aggregate(
            |e| e.name.starts_with(prefix),
            |e| (e.round, e.name.clone()),
        )
    }

    /// One row per completed entry.
    pub fn all(&self) -> Report {
        self.aggregate(|_| true, |e| e.run_num)
    }

    /// One row per completed entry whose name starts with `prefix`.
    pub fn select_by_prefix(&self, prefix: &str) -> Report {
        self.aggregate(|e| e.name.starts_with(prefix), |e| e.run_num)
    }

    fn aggregate<K, F, G>(&self, filter: F, key: G) -> Report
    where
        K: Eq + Hash,
        F: Fn(&Entry) -> bool,
        G: Fn(&Entry) -> K,
    {
        let inner = self.lock();
        let mut rows: Vec<StatsRow> = Vec::new();
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut reported = 0;

        for e in inner.entries.iter().filter(|e| filter(e)) {
            let Some(row) = e.to_row() else { continue };
            reported += 1;
            match index.get(&key(e)) {
                Some(&i) => rows[i].absorb(&row),
                None => {
                    index.insert(key(e), rows.len());
                    rows.push(row);
                }
            }
        }

        Report {
            rows,
            reported,
            out_of: inner.entries.len(),
            columns: Vec::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Attach by-round property columns and each row's values for its round.
pub fn with_by_round(mut report: Report, config: &Config) -> Report {
    report.columns = config.by_round_labels();
    if report.columns.is_empty() {
        return report;
    }
    for row in &mut report.rows {
        if let Some(round) = row.round {
            row.by_round = config.by_round_values(round);
        }
    }
    report
}
