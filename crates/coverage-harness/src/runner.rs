//! Sweep runner
//!
//! For every terminal count in the configured range, runs the configured
//! number of independently seeded trials and folds them into one
//! [`AggregateRow`]. Trials share no state; with the `parallel` feature they
//! fan out over a rayon pool and are reduced in trial order, so both builds
//! produce identical reports.

use crate::config::{SweepConfig, Variant};
use crate::reports::{AggregateRow, SweepReport};
use crate::seeding::{trial_rng, trial_seed};
use crate::Result;
use serde::{Deserialize, Serialize};
use site_selector::{
    select_greedy, CoverageSets, Formulation, Geometry, GreedyCoverModel, OptimizationModel,
    ProblemInstance, SolveOutcome,
};
use std::time::Instant;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ============================================================================
// Results
// ============================================================================

/// What one trial produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TrialOutcome {
    Greedy { selected_sites: usize, uncovered: usize },
    Model { outcome: SolveOutcome },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub terminal_count: usize,
    pub trial_index: u32,
    pub seed: u32,
    pub outcome: TrialOutcome,
}

impl TrialResult {
    /// Uncovered terminals of a greedy trial
    pub fn uncovered(&self) -> Option<usize> {
        match self.outcome {
            TrialOutcome::Greedy { uncovered, .. } => Some(uncovered),
            TrialOutcome::Model { .. } => None,
        }
    }

    /// Objective of a feasible model trial
    pub fn objective(&self) -> Option<f64> {
        match self.outcome {
            TrialOutcome::Model { outcome } => outcome.objective(),
            TrialOutcome::Greedy { .. } => None,
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct ExperimentHarness {
    config: SweepConfig,
    model: Box<dyn OptimizationModel>,
    keep_trials: bool,
}

impl ExperimentHarness {
    /// Solver variants fall back to [`GreedyCoverModel`] until a backend is attached
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            model: Box::new(GreedyCoverModel::new()),
            keep_trials: false,
        }
    }

    pub fn with_model(mut self, model: impl OptimizationModel + 'static) -> Self {
        self.model = Box::new(model);
        self
    }

    /// Embed every per-trial result in the report
    pub fn keep_trials(mut self, keep: bool) -> Self {
        self.keep_trials = keep;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run the full sweep
    pub fn run(&self) -> Result<SweepReport> {
        self.config.validate()?;
        let start = Instant::now();

        info!(
            "Sweeping n={}..={} with {} trials each ({:?}, k={}, A_max={})",
            self.config.min_terminals,
            self.config.max_terminals,
            self.config.trials_per_count,
            self.config.variant,
            self.config.grid_side,
            self.config.site_budget
        );
        if self.config.variant != Variant::Greedy {
            info!("Placement model: {}", self.model.name());
        }

        let mut rows = Vec::new();
        let mut kept = Vec::new();

        for n in self.config.terminal_counts() {
            let trials = self.run_count(n)?;
            let row = self.aggregate(n, &trials);

            match row.average {
                Some(avg) => info!("n={:>4} | {} = {:.4}", n, self.config.variant.metric_label(), avg),
                None => info!("n={:>4} | no feasible trial", n),
            }

            rows.push(row);
            if self.keep_trials {
                kept.extend(trials);
            }
        }

        info!("Sweep finished in {:.2?}", start.elapsed());

        Ok(SweepReport::new(self.config.clone(), rows, kept))
    }

    /// All trials for one terminal count, in trial order
    pub fn run_count(&self, terminal_count: usize) -> Result<Vec<TrialResult>> {
        let trials = self.config.trials_per_count;

        #[cfg(feature = "parallel")]
        let results: Vec<Result<TrialResult>> = (0..trials)
            .into_par_iter()
            .map(|i| self.run_trial(terminal_count, i))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<TrialResult>> = (0..trials)
            .map(|i| self.run_trial(terminal_count, i))
            .collect();

        results.into_iter().collect()
    }

    /// One seeded trial of the configured variant
    pub fn run_trial(&self, terminal_count: usize, trial_index: u32) -> Result<TrialResult> {
        match self.config.variant.formulation() {
            None => Ok(self.run_greedy_trial(terminal_count, trial_index)),
            Some(formulation) => self.run_model_trial(formulation, terminal_count, trial_index),
        }
    }

    pub fn run_greedy_trial(&self, terminal_count: usize, trial_index: u32) -> TrialResult {
        let geometry = self.trial_geometry(terminal_count, trial_index);
        let coverage = CoverageSets::build(
            &geometry.site_positions(),
            &geometry.terminal_positions(),
            self.config.coverage_radius,
        );
        let state = select_greedy(&coverage, self.config.site_budget);

        debug!(
            "Trial n={} i={}: {} sites active, {} uncovered",
            terminal_count,
            trial_index,
            state.selected().len(),
            state.uncovered()
        );

        TrialResult {
            terminal_count,
            trial_index,
            seed: trial_seed(terminal_count, trial_index),
            outcome: TrialOutcome::Greedy {
                selected_sites: state.selected().len(),
                uncovered: state.uncovered(),
            },
        }
    }

    pub fn run_model_trial(
        &self,
        formulation: Formulation,
        terminal_count: usize,
        trial_index: u32,
    ) -> Result<TrialResult> {
        let geometry = self.trial_geometry(terminal_count, trial_index);
        let instance = ProblemInstance::from_geometry(&geometry, formulation, self.config.model_params());
        let outcome = self.model.solve(&instance)?;

        debug!("Trial n={} i={}: {:?}", terminal_count, trial_index, outcome);

        Ok(TrialResult {
            terminal_count,
            trial_index,
            seed: trial_seed(terminal_count, trial_index),
            outcome: TrialOutcome::Model { outcome },
        })
    }

    fn trial_geometry(&self, terminal_count: usize, trial_index: u32) -> Geometry {
        let mut rng = trial_rng(terminal_count, trial_index);
        Geometry::generate(self.config.grid_side, terminal_count, &mut rng)
    }

    fn aggregate(&self, terminal_count: usize, trials: &[TrialResult]) -> AggregateRow {
        match self.config.variant {
            Variant::Greedy => {
                let uncovered: Vec<usize> = trials.iter().filter_map(TrialResult::uncovered).collect();
                AggregateRow::block_rate(terminal_count, &uncovered)
            }
            Variant::FixedPower | Variant::VariableRadius => {
                let objectives: Vec<f64> = trials.iter().filter_map(TrialResult::objective).collect();
                AggregateRow::mean_objective(terminal_count, trials.len(), &objectives)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HarnessError;
    use site_selector::ModelError;

    /// Feasible only for even terminal counts, objective = n
    struct EvenOnlyModel;

    impl OptimizationModel for EvenOnlyModel {
        fn name(&self) -> &str {
            "even-only"
        }

        fn solve(&self, instance: &ProblemInstance) -> site_selector::Result<SolveOutcome> {
            let n = instance.terminals.len();
            Ok(if n % 2 == 0 {
                SolveOutcome::Solved(n as f64)
            } else {
                SolveOutcome::Infeasible
            })
        }
    }

    /// Infeasible whenever the first terminal lands in the left half
    struct HalfPlaneModel;

    impl OptimizationModel for HalfPlaneModel {
        fn name(&self) -> &str {
            "half-plane"
        }

        fn solve(&self, instance: &ProblemInstance) -> site_selector::Result<SolveOutcome> {
            match instance.terminals.first() {
                Some(t) if t.x < 5.0 => Ok(SolveOutcome::Infeasible),
                _ => Ok(SolveOutcome::Solved(10.0)),
            }
        }
    }

    struct BrokenModel;

    impl OptimizationModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn solve(&self, _: &ProblemInstance) -> site_selector::Result<SolveOutcome> {
            Err(ModelError::Backend("licence expired".to_string()))
        }
    }

    #[test]
    fn test_greedy_sweep_shape() {
        let config = SweepConfig::new().terminals(1, 10).trials(4);
        let report = ExperimentHarness::new(config).run().unwrap();

        assert_eq!(report.rows.len(), 10);
        for (row, n) in report.rows.iter().zip(1..) {
            assert_eq!(row.terminal_count, n);
            assert_eq!(row.trials, 4);
            let rate = row.average.unwrap();
            assert!((0.0..=100.0).contains(&rate));
        }
        assert!(report.trials.is_empty());
    }

    #[test]
    fn test_sparse_counts_never_block() {
        // Budget 30 and every terminal reachable at r_min: nothing is left over
        let config = SweepConfig::new().terminals(1, 30).trials(3);
        let report = ExperimentHarness::new(config).run().unwrap();
        assert!(report.rows.iter().all(|r| r.average == Some(0.0)));
    }

    #[test]
    fn test_five_terminal_scenario_is_stable() {
        let harness = ExperimentHarness::new(SweepConfig::default());
        for _ in 0..3 {
            let trial = harness.run_greedy_trial(5, 0);
            assert_eq!(trial.uncovered(), Some(0));
            assert_eq!(trial.seed, trial_seed(5, 0));
        }
    }

    #[test]
    fn test_block_rate_reproducible_bit_for_bit() {
        let config = SweepConfig::new().terminals(100, 100);
        let a = ExperimentHarness::new(config.clone()).run().unwrap();
        let b = ExperimentHarness::new(config).run().unwrap();

        let rate_a = a.rows[0].average.unwrap();
        let rate_b = b.rows[0].average.unwrap();
        assert_eq!(rate_a.to_bits(), rate_b.to_bits());
        assert!(rate_a > 0.0, "100 terminals should overflow 30 sites at r_min");
    }

    #[test]
    fn test_trial_independent_of_sweep_order() {
        let harness = ExperimentHarness::new(SweepConfig::new().terminals(40, 60).trials(5)).keep_trials(true);
        let report = harness.run().unwrap();

        let lone = ExperimentHarness::new(SweepConfig::new()).run_greedy_trial(47, 3);
        let swept = report
            .trials
            .iter()
            .find(|t| t.terminal_count == 47 && t.trial_index == 3)
            .unwrap();
        assert_eq!(swept, &lone);
    }

    #[test]
    fn test_zero_budget_blocks_everything() {
        let config = SweepConfig::new().site_budget(0).terminals(1, 5).trials(2);
        let report = ExperimentHarness::new(config).run().unwrap();
        assert!(report.rows.iter().all(|r| r.average == Some(100.0)));
    }

    #[test]
    fn test_zero_terminal_row() {
        let config = SweepConfig::new().terminals(0, 0).trials(2);
        let report = ExperimentHarness::new(config).run().unwrap();
        assert_eq!(report.rows[0].average, Some(0.0));
    }

    #[test]
    fn test_infeasible_counts_report_no_data() {
        let config = SweepConfig::new()
            .variant(Variant::FixedPower)
            .terminals(1, 4)
            .trials(3);
        let report = ExperimentHarness::new(config).with_model(EvenOnlyModel).run().unwrap();

        assert_eq!(report.rows[0].average, None);
        assert_eq!(report.rows[1].average, Some(2.0));
        assert_eq!(report.rows[2].average, None);
        assert_eq!(report.rows[3].average, Some(4.0));
        assert_eq!(report.rows[0].feasible_trials, 0);
        assert_eq!(report.rows[1].feasible_trials, 3);
    }

    #[test]
    fn test_infeasible_trials_skipped_from_mean() {
        let config = SweepConfig::new()
            .variant(Variant::VariableRadius)
            .terminals(3, 3)
            .trials(20);
        let harness = ExperimentHarness::new(config).with_model(HalfPlaneModel).keep_trials(true);
        let report = harness.run().unwrap();
        let row = &report.rows[0];

        let feasible = report.trials.iter().filter(|t| t.objective().is_some()).count();
        assert_eq!(row.feasible_trials, feasible);
        if feasible > 0 {
            assert_eq!(row.average, Some(10.0));
        } else {
            assert_eq!(row.average, None);
        }
    }

    #[test]
    fn test_backend_failure_is_fatal() {
        let config = SweepConfig::new().variant(Variant::FixedPower).terminals(1, 2).trials(1);
        let err = ExperimentHarness::new(config).with_model(BrokenModel).run().unwrap_err();
        assert!(matches!(err, HarnessError::Model(ModelError::Backend(_))));
    }

    #[test]
    fn test_default_model_runs_solver_variant() {
        let config = SweepConfig::new()
            .variant(Variant::FixedPower)
            .terminals(1, 3)
            .trials(2);
        let report = ExperimentHarness::new(config).run().unwrap();
        // At least one site is active and no terminal needs more than one
        for row in &report.rows {
            let avg = row.average.unwrap();
            assert!(avg >= 100.0 && avg <= 100.0 * row.terminal_count as f64, "n={} avg={}", row.terminal_count, avg);
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let config = SweepConfig::new().trials(0);
        assert!(matches!(
            ExperimentHarness::new(config).run(),
            Err(HarnessError::InvalidConfig(_))
        ));
    }
}
