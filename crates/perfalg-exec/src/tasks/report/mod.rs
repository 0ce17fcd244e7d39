//! Report tasks: log a statistics aggregation as a text table or JSON.

mod render;
pub use render::{render_json, render_text};

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use perfalg_core::{RunData, Stats, Task, TaskError, stats::with_by_round};
use perfalg_model::Report;
use tracing::info;

use crate::error::BuiltinError;

/// Output format chosen by `report.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = BuiltinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(BuiltinError::InvalidReportFormat(s.to_string())),
        }
    }
}

/// Which aggregation a report task shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    All,
    SumByName,
    SumByNameRound,
    SumByPref,
    SumByPrefRound,
    SelectByPref,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::All,
        ReportKind::SumByName,
        ReportKind::SumByNameRound,
        ReportKind::SumByPref,
        ReportKind::SumByPrefRound,
        ReportKind::SelectByPref,
    ];

    pub fn task_name(self) -> &'static str {
        match self {
            ReportKind::All => "RepAll",
            ReportKind::SumByName => "RepSumByName",
            ReportKind::SumByNameRound => "RepSumByNameRound",
            ReportKind::SumByPref => "RepSumByPref",
            ReportKind::SumByPrefRound => "RepSumByPrefRound",
            ReportKind::SelectByPref => "RepSelectByPref",
        }
    }

    #[inline]
    pub fn needs_prefix(self) -> bool {
        matches!(
            self,
            ReportKind::SumByPref | ReportKind::SumByPrefRound | ReportKind::SelectByPref
        )
    }

    pub fn title(self, prefix: &str) -> String {
        match self {
            ReportKind::All => "Report All".to_string(),
            ReportKind::SumByName => "Report Sum By (any) Name".to_string(),
            ReportKind::SumByNameRound => "Report Sum By (any) Name and Round".to_string(),
            ReportKind::SumByPref => format!("Report Sum By Prefix ({prefix})"),
            ReportKind::SumByPrefRound => format!("Report Sum By Prefix ({prefix}) and Round"),
            ReportKind::SelectByPref => format!("Report Select By Prefix ({prefix})"),
        }
    }

    pub fn query(self, stats: &Stats, prefix: &str) -> Report {
        match self {
            ReportKind::All => stats.all(),
            ReportKind::SumByName => stats.by_name(),
            ReportKind::SumByNameRound => stats.by_name_round(),
            ReportKind::SumByPref => stats.by_prefix(prefix),
            ReportKind::SumByPrefRound => stats.by_prefix_round(prefix),
            ReportKind::SelectByPref => stats.select_by_prefix(prefix),
        }
    }
}

/// Logs one aggregation of the run's statistics.
#[derive(Clone)]
pub struct ReportTask {
    kind: ReportKind,
    run: Arc<RunData>,
    prefix: Option<String>,
}

impl ReportTask {
    pub fn new(kind: ReportKind, run: &Arc<RunData>) -> Self {
        Self {
            kind,
            run: Arc::clone(run),
            prefix: None,
        }
    }

    /// Aggregate and render without logging.
    pub fn render(&self) -> Result<(Report, String), BuiltinError> {
        let prefix = match (&self.prefix, self.kind.needs_prefix()) {
            (Some(p), _) => p.as_str(),
            (None, false) => "",
            (None, true) => {
                return Err(BuiltinError::MissingParam {
                    task: self.kind.task_name(),
                    expected: "name prefix",
                });
            }
        };

        let config = self.run.config();
        let report = with_by_round(self.kind.query(self.run.stats(), prefix), config);
        let format: ReportFormat = config.get_string("report.format", "text").parse()?;
        let title = self.kind.title(prefix);
        let rendered = match format {
            ReportFormat::Text => render_text(&title, &report),
            ReportFormat::Json => render_json(&report)?,
        };
        Ok((report, rendered))
    }
}

#[async_trait]
impl Task for ReportTask {
    fn name(&self) -> &str {
        self.kind.task_name()
    }

    fn supports_params(&self) -> bool {
        self.kind.needs_prefix()
    }

    fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        let prefix = params.trim();
        if prefix.is_empty() {
            return Err(BuiltinError::MissingParam {
                task: self.kind.task_name(),
                expected: "name prefix",
            }
            .into());
        }
        self.prefix = Some(prefix.to_string());
        Ok(())
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        let (report, rendered) = self.render()?;
        info!(
            report = self.kind.task_name(),
            rows = report.len(),
            reported = report.reported,
            out_of = report.out_of,
            "\n{rendered}"
        );
        Ok(0)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }

    fn records_stats(&self) -> bool {
        false
    }

    fn logs_start(&self) -> bool {
        false
    }
}
