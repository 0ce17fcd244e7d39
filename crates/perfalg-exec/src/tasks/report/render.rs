use perfalg_model::{Report, StatsRow};

use crate::error::BuiltinError;

const FIXED: [&str; 6] = [
    "runCnt",
    "recsPerRun",
    "rec/s",
    "elapsedSec",
    "avgUsedMem",
    "avgTotalMem",
];

/// Aligned text table with a title line.
pub fn render_text(title: &str, report: &Report) -> String {
    let mut header = vec!["Operation".to_string(), "round".to_string()];
    header.extend(report.columns.iter().cloned());
    header.extend(FIXED.iter().map(|s| s.to_string()));

    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|r| cells(r, report.columns.len()))
        .collect();

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = format!(
        "------------> {title} ({} about {} out of {})\n",
        report.len(),
        report.reported,
        report.out_of
    );
    out.push_str(&line(&header, &widths));
    for row in &rows {
        out.push('\n');
        out.push_str(&line(row, &widths));
    }
    out
}

pub fn render_json(report: &Report) -> Result<String, BuiltinError> {
    serde_json::to_string_pretty(report).map_err(|e| BuiltinError::Render(e.to_string()))
}

fn cells(row: &StatsRow, by_round_columns: usize) -> Vec<String> {
    let mut cells = vec![
        row.name.clone(),
        row.round.map_or_else(|| "-".to_string(), |r| r.to_string()),
    ];
    for i in 0..by_round_columns {
        cells.push(row.by_round.get(i).cloned().unwrap_or_else(|| "-".to_string()));
    }
    cells.extend([
        row.runs.to_string(),
        row.records_per_run().to_string(),
        format!("{:.2}", row.rate()),
        format!("{:.2}", row.elapsed_secs()),
        format!("{:.0}", row.avg_used_mem()),
        format!("{:.0}", row.avg_tot_mem()),
    ]);
    cells
}

/// Operation name left-aligned, everything else right-aligned.
fn line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (c, w))| {
            if i == 0 {
                format!("{c:<w$}")
            } else {
                format!("{c:>w$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
