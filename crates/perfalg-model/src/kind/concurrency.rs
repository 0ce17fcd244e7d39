use serde::{Deserialize, Serialize};

/// How a sequence runs its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Concurrency {
    /// Children run one after another, in declared order.
    #[default]
    Serial,
    /// Every child (times the repetition count) runs as an independent concurrent unit.
    Parallel,
}

impl Concurrency {
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Concurrency::Parallel)
    }

    /// Opening delimiter in the algorithm grammar.
    #[inline]
    pub fn open(self) -> char {
        match self {
            Concurrency::Serial => '{',
            Concurrency::Parallel => '[',
        }
    }

    /// Closing delimiter in the algorithm grammar.
    #[inline]
    pub fn close(self) -> char {
        match self {
            Concurrency::Serial => '}',
            Concurrency::Parallel => ']',
        }
    }

    /// Default sequence name when the algorithm gives no label.
    pub fn default_name(self) -> &'static str {
        match self {
            Concurrency::Serial => "Seq",
            Concurrency::Parallel => "Par",
        }
    }
}
