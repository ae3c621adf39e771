//! Sweep configuration
//!
//! Defaults match the reference study (11×11 grid, 30 active sites, 20 trials
//! for each of 1..=100 terminals). Any field can be overridden from a TOML
//! file or the builder methods.

use crate::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use site_selector::{
    Formulation, ModelParams, DEFAULT_COVERAGE_RADIUS, DEFAULT_GRID_SIDE, DEFAULT_MAX_RADIUS,
    DEFAULT_POWER_UNIT, DEFAULT_SITE_BUDGET,
};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

/// Smallest terminal count swept by default
pub const DEFAULT_MIN_TERMINALS: usize = 1;

/// Largest terminal count swept by default (inclusive)
pub const DEFAULT_MAX_TERMINALS: usize = 100;

/// Independent trials per terminal count
pub const DEFAULT_TRIALS_PER_COUNT: u32 = 20;

/// Which placement strategy the sweep evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Budgeted greedy selection at r_min; metric is block rate
    #[default]
    Greedy,
    /// Minimum active sites covering everything at r_max
    FixedPower,
    /// Minimum total power with per-site radius in [r_min, r_max]
    VariableRadius,
}

impl Variant {
    /// Formulation handed to a placement model; `None` for the greedy variant
    pub fn formulation(&self) -> Option<Formulation> {
        match self {
            Self::Greedy => None,
            Self::FixedPower => Some(Formulation::FixedPower),
            Self::VariableRadius => Some(Formulation::VariableRadius),
        }
    }

    /// Column header for the averaged metric
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Greedy => "average block rate [%]",
            Self::FixedPower | Self::VariableRadius => "average total objective [P_min]",
        }
    }

    /// Machine-friendly column name for tabular output
    pub fn metric_column(&self) -> &'static str {
        match self {
            Self::Greedy => "average_block_rate_percent",
            Self::FixedPower | Self::VariableRadius => "average_total_objective",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SweepConfig {
    /// k: sites form a k×k grid
    pub grid_side: usize,
    /// r_min
    pub coverage_radius: f64,
    /// r_max, solver variants only
    pub max_radius: f64,
    /// A_max
    pub site_budget: usize,
    /// P_min
    pub power_unit: f64,
    pub min_terminals: usize,
    pub max_terminals: usize,
    pub trials_per_count: u32,
    pub variant: Variant,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grid_side: DEFAULT_GRID_SIDE,
            coverage_radius: DEFAULT_COVERAGE_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            site_budget: DEFAULT_SITE_BUDGET,
            power_unit: DEFAULT_POWER_UNIT,
            min_terminals: DEFAULT_MIN_TERMINALS,
            max_terminals: DEFAULT_MAX_TERMINALS,
            trials_per_count: DEFAULT_TRIALS_PER_COUNT,
            variant: Variant::Greedy,
        }
    }
}

impl SweepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading sweep config from {:?}", path);

        let content = std::fs::read_to_string(path)?;
        let config: SweepConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn grid_side(mut self, k: usize) -> Self {
        self.grid_side = k;
        self
    }

    pub fn coverage_radius(mut self, r: f64) -> Self {
        self.coverage_radius = r;
        self
    }

    pub fn max_radius(mut self, r: f64) -> Self {
        self.max_radius = r;
        self
    }

    pub fn site_budget(mut self, budget: usize) -> Self {
        self.site_budget = budget;
        self
    }

    pub fn power_unit(mut self, p: f64) -> Self {
        self.power_unit = p;
        self
    }

    pub fn terminals(mut self, min: usize, max: usize) -> Self {
        self.min_terminals = min;
        self.max_terminals = max;
        self
    }

    pub fn trials(mut self, trials: u32) -> Self {
        self.trials_per_count = trials;
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn terminal_counts(&self) -> RangeInclusive<usize> {
        self.min_terminals..=self.max_terminals
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            site_budget: self.site_budget,
            power_unit: self.power_unit,
            min_radius: self.coverage_radius,
            max_radius: self.max_radius,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_side == 0 {
            return Err(invalid("grid-side must be at least 1"));
        }
        if !(self.coverage_radius.is_finite() && self.coverage_radius >= 0.0) {
            return Err(invalid(format!(
                "coverage-radius must be finite and non-negative, got {}",
                self.coverage_radius
            )));
        }
        if self.min_terminals > self.max_terminals {
            return Err(invalid(format!(
                "min-terminals ({}) exceeds max-terminals ({})",
                self.min_terminals, self.max_terminals
            )));
        }
        if self.trials_per_count == 0 {
            return Err(invalid("trials-per-count must be at least 1"));
        }
        if self.variant.formulation().is_some() {
            if self.coverage_radius == 0.0 {
                return Err(invalid("coverage-radius must be positive for solver variants"));
            }
            if !(self.max_radius.is_finite() && self.max_radius >= self.coverage_radius) {
                return Err(invalid(format!(
                    "max-radius ({}) must be finite and at least coverage-radius ({})",
                    self.max_radius, self.coverage_radius
                )));
            }
            if !(self.power_unit.is_finite() && self.power_unit >= 0.0) {
                return Err(invalid(format!("power-unit must be non-negative, got {}", self.power_unit)));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> HarnessError {
    HarnessError::InvalidConfig(msg.into())
}
