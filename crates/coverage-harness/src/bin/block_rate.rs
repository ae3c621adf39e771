//! Coverage Sweep CLI
//!
//! Runs the full terminal-count sweep and writes one row per count.
//!
//! Usage:
//!   block-rate --output data/block_rate.csv
//!   block-rate --variant fixed-power --output data/fixed_power.json
//!   block-rate --config sweep.toml --trials 50

use anyhow::Result;
use clap::Parser;
use coverage_harness::config::{SweepConfig, Variant};
use coverage_harness::reports::ReportFormat;
use coverage_harness::runner::ExperimentHarness;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    name = "block-rate",
    about = "Evaluate budgeted antenna site coverage over a sweep of terminal counts"
)]
struct Args {
    /// TOML sweep config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Placement strategy to evaluate
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Output report file
    #[arg(short, long, default_value = "data/block_rate.csv")]
    output: PathBuf,

    /// Report format (guessed from the output extension if omitted)
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Grid side k
    #[arg(long)]
    grid_side: Option<usize>,

    /// Active site budget A_max
    #[arg(long)]
    budget: Option<usize>,

    /// Greedy serving radius r_min
    #[arg(long)]
    radius: Option<f64>,

    /// Smallest terminal count
    #[arg(long)]
    min_terminals: Option<usize>,

    /// Largest terminal count (inclusive)
    #[arg(long)]
    max_terminals: Option<usize>,

    /// Trials per terminal count
    #[arg(long)]
    trials: Option<u32>,

    /// Embed per-trial results (JSON output only)
    #[arg(long)]
    keep_trials: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn sweep_config(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::load(path)?,
            None => SweepConfig::default(),
        };

        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(k) = self.grid_side {
            config.grid_side = k;
        }
        if let Some(budget) = self.budget {
            config.site_budget = budget;
        }
        if let Some(radius) = self.radius {
            config.coverage_radius = radius;
        }
        if let Some(min) = self.min_terminals {
            config.min_terminals = min;
        }
        if let Some(max) = self.max_terminals {
            config.max_terminals = max;
        }
        if let Some(trials) = self.trials {
            config.trials_per_count = trials;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose when set
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Antenna Site Coverage Sweep");
    info!("{}", "=".repeat(60));

    let config = args.sweep_config()?;
    let harness = ExperimentHarness::new(config).keep_trials(args.keep_trials);
    let report = harness.run()?;

    let format = args.format.unwrap_or_else(|| ReportFormat::from_path(&args.output));
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    report.write(&args.output, format)?;

    // Summary
    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Variant: {:?}", report.variant);
    info!("Rows: {}", report.rows.len());
    let no_data = report.rows.iter().filter(|r| r.average.is_none()).count();
    if no_data > 0 {
        info!("Counts with no feasible trial: {}", no_data);
    }
    if let Some(last) = report.rows.last() {
        info!(
            "n={}: {} = {}",
            last.terminal_count,
            report.metric,
            last.average.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
        );
    }
    info!("Report: {:?}", args.output);

    Ok(())
}
