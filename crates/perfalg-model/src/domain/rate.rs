use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Time unit of a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RateUnit {
    #[default]
    Sec,
    Min,
}

impl RateUnit {
    #[inline]
    pub fn duration(self) -> Duration {
        match self {
            RateUnit::Sec => Duration::from_secs(1),
            RateUnit::Min => Duration::from_secs(60),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RateUnit::Sec => "sec",
            RateUnit::Min => "min",
        }
    }
}

/// Rate limit of a sequence: at most `ops` starts per `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Operations per unit; always greater than zero.
    pub ops: u32,
    pub unit: RateUnit,
}

impl Rate {
    pub fn new(ops: u32, unit: RateUnit) -> Self {
        Self { ops, unit }
    }

    pub fn per_sec(ops: u32) -> Self {
        Self::new(ops, RateUnit::Sec)
    }

    pub fn per_min(ops: u32) -> Self {
        Self::new(ops, RateUnit::Min)
    }

    /// Fixed distance between two ideal start times.
    #[inline]
    pub fn delay_step(&self) -> Duration {
        self.unit.duration() / self.ops.max(1)
    }

    /// Rate normalised to operations per minute.
    #[inline]
    pub fn per_minute(&self) -> u64 {
        match self.unit {
            RateUnit::Sec => u64::from(self.ops) * 60,
            RateUnit::Min => u64::from(self.ops),
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ops, self.unit.as_str())
    }
}
