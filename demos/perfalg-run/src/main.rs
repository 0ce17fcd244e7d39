use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use perfalg_core::{Benchmark, Config, RunData, TaskRegistry};
use perfalg_exec::{SyntheticSource, register_builtins};
use perfalg_observe::{LoggerConfig, LoggerFormat, logger_init};

/// Run an `.alg` benchmark file.
#[derive(Debug, Parser)]
#[command(name = "perfalg-run", about = "Parse and execute a benchmark algorithm file.")]
struct Cli {
    /// Algorithm file: property lines followed by the algorithm.
    #[arg(value_name = "FILE")]
    alg: PathBuf,
    /// Log output format (text, json or journald).
    #[arg(long, default_value = "text")]
    log_format: LoggerFormat,
    /// Log filter directive.
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Parse and print the algorithm without executing it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) Logger
    logger_init(&LoggerConfig::new(cli.log_format, cli.log_level.clone()))?;

    // 2) Configuration
    let text = std::fs::read_to_string(&cli.alg)
        .with_context(|| format!("reading {}", cli.alg.display()))?;
    let config = Config::from_alg_text(&text)?;

    // 3) Run context with the synthetic content source
    let source = SyntheticSource::from_config(&config)?;
    let run = Arc::new(RunData::new(config).with_source(Arc::new(source)));

    // 4) Tasks
    let mut tasks = TaskRegistry::new();
    register_builtins(&mut tasks);

    // 5) Parse
    let mut bench = Benchmark::new(run, &tasks)?;
    info!(algorithm = %bench.algorithm(), "parsed algorithm");
    info!("\n{}", bench.algorithm().tree());
    if cli.dry_run {
        return Ok(());
    }

    // 6) Execute
    let summary = bench.execute().await?;
    info!(
        run_id = %summary.run_id,
        count = summary.count,
        raw_count = summary.raw_count,
        exhausted = summary.exhausted,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "benchmark finished"
    );
    Ok(())
}
