mod repetition;
pub use repetition::Repetition;

mod rate;
pub use rate::{Rate, RateUnit};

mod descriptor;
pub use descriptor::TaskDescriptor;

mod stats_row;
pub use stats_row::StatsRow;

mod report;
pub use report::Report;

/// Round counter of a multi-round run.
///
/// Advanced between repeated executions of the whole algorithm; selects the value of
/// by-round properties.
pub type Round = u32;
