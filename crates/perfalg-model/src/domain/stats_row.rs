use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Round;

/// One row of a statistics report.
///
/// Either a single completed invocation or the fold of several invocations sharing a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRow {
    /// Task display name.
    pub name: String,
    /// Round of the folded invocations; `None` when they span several rounds.
    pub round: Option<Round>,
    /// Number of invocations folded into this row.
    pub runs: u64,
    /// Total work items.
    pub count: u64,
    /// Total measured time.
    pub elapsed: Duration,
    /// Sum of per-invocation peak used memory, in bytes.
    pub max_used_mem: u64,
    /// Sum of per-invocation total memory, in bytes.
    pub max_tot_mem: u64,
    /// Other invocations started while this one was open (single rows only).
    pub parallelism: u64,
    /// Values of by-round properties for `round`, in column order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_round: Vec<String>,
}

impl StatsRow {
    /// Average work items per run (integer division, like the report column).
    pub fn records_per_run(&self) -> u64 {
        self.count / self.runs.max(1)
    }

    /// Throughput in work items per second.
    ///
    /// Elapsed time is floored at 1ms so near-instant tasks do not divide by zero.
    pub fn rate(&self) -> f64 {
        let millis = (self.elapsed.as_secs_f64() * 1000.0).max(1.0);
        self.count as f64 * 1000.0 / millis
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn avg_used_mem(&self) -> f64 {
        self.max_used_mem as f64 / self.runs.max(1) as f64
    }

    pub fn avg_tot_mem(&self) -> f64 {
        self.max_tot_mem as f64 / self.runs.max(1) as f64
    }

    /// Fold another row into this one.
    pub fn absorb(&mut self, other: &StatsRow) {
        self.runs += other.runs;
        self.count += other.count;
        self.elapsed += other.elapsed;
        self.max_used_mem += other.max_used_mem;
        self.max_tot_mem += other.max_tot_mem;
        if self.round != other.round {
            self.round = None;
            self.by_round.clear();
        }
    }
}
