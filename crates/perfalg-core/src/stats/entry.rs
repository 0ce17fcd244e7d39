use std::time::{Duration, Instant};

use perfalg_model::{Round, StatsRow};

use crate::memory::MemorySample;

/// One recorded task invocation.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Statistics name of the task.
    pub name: String,
    /// Global invocation index.
    pub run_num: u64,
    pub round: Round,
    pub started_at: Instant,
    /// Measured time; `Some` once the invocation completed.
    pub elapsed: Option<Duration>,
    /// Work items done.
    pub count: u64,
    /// Other invocations started while this one was open.
    pub parallelism: u64,
    /// Peak memory seen at start and end.
    pub mem: MemorySample,
}

impl Entry {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Single-run report row, `None` while the invocation is still open.
    pub fn to_row(&self) -> Option<StatsRow> {
        let elapsed = self.elapsed?;
        Some(StatsRow {
            name: self.name.clone(),
            round: Some(self.round),
            runs: 1,
            count: self.count,
            elapsed,
            max_used_mem: self.mem.used,
            max_tot_mem: self.mem.total,
            parallelism: self.parallelism,
            by_round: Vec::new(),
        })
    }
}

/// Ticket returned by `Stats::mark_start`, consumed by `Stats::mark_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHandle {
    pub(crate) slot: usize,
    pub(crate) run_num: u64,
    pub(crate) generation: u64,
}

impl EntryHandle {
    #[inline]
    pub fn run_num(&self) -> u64 {
        self.run_num
    }
}
