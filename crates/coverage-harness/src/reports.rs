//! Sweep reporting and export
//!
//! One row per terminal count. CSV is the primary tabular format; JSON carries
//! the effective config and optional per-trial detail; Markdown is for
//! reading in a terminal or a PR.

use crate::config::{SweepConfig, Variant};
use crate::runner::TrialResult;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Printed in place of an average when every trial was infeasible
pub const NO_DATA: &str = "-";

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub terminal_count: usize,
    /// Averaged metric; `None` when no trial produced a value
    pub average: Option<f64>,
    pub trials: usize,
    pub feasible_trials: usize,
}

impl AggregateRow {
    /// `mean(uncovered) / n × 100`; zero terminals block nothing
    pub fn block_rate(terminal_count: usize, uncovered: &[usize]) -> Self {
        let average = if uncovered.is_empty() {
            None
        } else if terminal_count == 0 {
            Some(0.0)
        } else {
            let mean = uncovered.iter().map(|&u| u as f64).sum::<f64>() / uncovered.len() as f64;
            Some(mean / terminal_count as f64 * 100.0)
        };

        Self {
            terminal_count,
            average,
            trials: uncovered.len(),
            feasible_trials: uncovered.len(),
        }
    }

    /// Mean over the feasible trials only
    pub fn mean_objective(terminal_count: usize, trials: usize, objectives: &[f64]) -> Self {
        let average = if objectives.is_empty() {
            None
        } else {
            Some(objectives.iter().sum::<f64>() / objectives.len() as f64)
        };

        Self {
            terminal_count,
            average,
            trials,
            feasible_trials: objectives.len(),
        }
    }

    fn average_cell(&self) -> String {
        self.average.map_or_else(|| NO_DATA.to_string(), |v| v.to_string())
    }
}

// ============================================================================
// Report
// ============================================================================

/// Output format of a persisted report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    Csv,
    Json,
    Markdown,
}

impl ReportFormat {
    /// Guess from a file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Csv,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub variant: Variant,
    pub metric: String,
    pub config: SweepConfig,
    pub rows: Vec<AggregateRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trials: Vec<TrialResult>,
}

impl SweepReport {
    pub fn new(config: SweepConfig, rows: Vec<AggregateRow>, trials: Vec<TrialResult>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            variant: config.variant,
            metric: config.variant.metric_label().to_string(),
            config,
            rows,
            trials,
        }
    }

    pub fn row(&self, terminal_count: usize) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| r.terminal_count == terminal_count)
    }

    /// Two columns: terminal count and the averaged metric
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str(&format!("terminal_count,{}\n", self.variant.metric_column()));
        for row in &self.rows {
            csv.push_str(&format!("{},{}\n", row.terminal_count, row.average_cell()));
        }
        csv
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Coverage Sweep Report\n\n");
        md.push_str(&format!("**Generated:** {}\n", self.generated_at));
        md.push_str(&format!("**Variant:** {:?}\n\n", self.variant));

        md.push_str("## Parameters\n\n");
        md.push_str("| Parameter | Value |\n");
        md.push_str("|-----------|-------|\n");
        md.push_str(&format!("| k | {} |\n", self.config.grid_side));
        md.push_str(&format!("| r_min | {} |\n", self.config.coverage_radius));
        if self.variant != Variant::Greedy {
            md.push_str(&format!("| r_max | {} |\n", self.config.max_radius));
            md.push_str(&format!("| P_min | {} |\n", self.config.power_unit));
        }
        md.push_str(&format!("| A_max | {} |\n", self.config.site_budget));
        md.push_str(&format!("| Trials per n | {} |\n\n", self.config.trials_per_count));

        md.push_str("## Results\n\n");
        md.push_str(&format!("| n | {} | Feasible |\n", self.metric));
        md.push_str("|---|---|---|\n");
        for row in &self.rows {
            let value = row.average.map_or_else(|| NO_DATA.to_string(), |v| format!("{:.4}", v));
            md.push_str(&format!(
                "| {} | {} | {}/{} |\n",
                row.terminal_count, value, row.feasible_trials, row.trials
            ));
        }

        md
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Csv => Ok(self.to_csv()),
            ReportFormat::Json => self.to_json(),
            ReportFormat::Markdown => Ok(self.to_markdown()),
        }
    }

    /// Write the report to `path`
    pub fn write(&self, path: impl AsRef<Path>, format: ReportFormat) -> Result<()> {
        let path = path.as_ref();
        info!("Writing {:?} report to {:?}", format, path);

        let rendered = self.render(format)?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(rendered.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
