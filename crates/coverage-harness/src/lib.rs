//! Coverage Sweep Harness
//!
//! Drives seeded Monte-Carlo trials of the antenna site selector over a range
//! of terminal counts and aggregates them into one report row per count.
//!
//! # Usage
//!
//! ```rust,no_run
//! use coverage_harness::prelude::*;
//!
//! let config = SweepConfig::new().terminals(1, 20).trials(5);
//! let report = ExperimentHarness::new(config).run().unwrap();
//! println!("{}", report.to_csv());
//! ```
//!
//! Trial `(n, i)` always draws its geometry from `trial_seed(n, i)`, so a
//! sweep reproduces bit-for-bit regardless of execution order.

use thiserror::Error;

pub mod config;
pub mod reports;
pub mod runner;
pub mod seeding;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Model error: {0}")]
    Model(#[from] site_selector::ModelError),
}

pub type Result<T> = std::result::Result<T, HarnessError>;

pub mod prelude {
    pub use crate::config::{SweepConfig, Variant};
    pub use crate::reports::{AggregateRow, ReportFormat, SweepReport};
    pub use crate::runner::{ExperimentHarness, TrialResult};
    pub use crate::seeding::{trial_rng, trial_seed};
    pub use crate::{HarnessError, Result};
    pub use site_selector::{GreedyCoverModel, OptimizationModel, ProblemInstance, SolveOutcome};
}
