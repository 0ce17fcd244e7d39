//! Built-in tasks.

mod inputs;
pub use inputs::{ConsumeContentSource, ResetInputs};

mod props;
pub use props::SetProp;

mod report;
pub use report::{ReportFormat, ReportKind, ReportTask};

mod round;
pub use round::NewRound;

mod stats;
pub use stats::ClearStats;

mod wait;
pub use wait::Wait;

use perfalg_core::TaskRegistry;
use tracing::debug;

/// Register every built-in task under its algorithm name.
pub fn register_builtins(tasks: &mut TaskRegistry) {
    tasks.register(NewRound::NAME, |run| Box::new(NewRound::new(run)));
    tasks.register(SetProp::NAME, |run| Box::new(SetProp::new(run)));
    tasks.register(ResetInputs::NAME, |run| Box::new(ResetInputs::new(run)));
    tasks.register(ClearStats::NAME, |run| Box::new(ClearStats::new(run)));
    tasks.register(Wait::NAME, |_| Box::new(Wait::default()));
    tasks.register(ConsumeContentSource::NAME, |run| {
        Box::new(ConsumeContentSource::new(run))
    });
    for kind in ReportKind::ALL {
        tasks.register(kind.task_name(), move |run| Box::new(ReportTask::new(kind, run)));
    }
    debug!("built-in tasks registered");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtins_are_registered() {
        let mut tasks = TaskRegistry::new();
        register_builtins(&mut tasks);
        for name in [
            "NewRound",
            "SetProp",
            "ResetInputs",
            "ClearStats",
            "Wait",
            "ConsumeContentSource",
            "RepAll",
            "RepSumByName",
            "RepSumByNameRound",
            "RepSumByPref",
            "RepSumByPrefRound",
            "RepSelectByPref",
        ] {
            assert!(tasks.contains(name), "{name}");
        }
    }
}
