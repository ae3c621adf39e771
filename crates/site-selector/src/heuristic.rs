//! Solver-free placement model
//!
//! Greedy set cover under the site budget. Gives a feasible placement (an
//! upper bound on the exact optimum) for both formulations, or `Infeasible`
//! when no greedy cover reaches every terminal in budget.

use crate::coverage::CoverageSets;
use crate::model::{Formulation, OptimizationModel, ProblemInstance, SolveOutcome};
use crate::selector::select_greedy;
use crate::{Point, Result};
use tracing::debug;

/// Fixed-power objective scale per active site
const FIXED_POWER_SCALE: f64 = 100.0;

/// Radii tried between r_min and r_max for the variable-radius formulation
const RADIUS_LADDER_STEPS: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyCoverModel;

impl GreedyCoverModel {
    pub fn new() -> Self {
        Self
    }
}

impl OptimizationModel for GreedyCoverModel {
    fn name(&self) -> &str {
        "greedy-cover"
    }

    fn solve(&self, instance: &ProblemInstance) -> Result<SolveOutcome> {
        instance.validate()?;
        let params = &instance.params;

        let objective = match instance.formulation {
            Formulation::FixedPower => cover_at(instance, params.max_radius)
                .map(|active| FIXED_POWER_SCALE * params.power_unit * active.len() as f64),
            Formulation::VariableRadius => radius_ladder(params.min_radius, params.max_radius)
                .filter_map(|radius| cover_at(instance, radius))
                .map(|active| variable_radius_cost(instance, &active))
                .fold(None, |best: Option<f64>, cost| Some(best.map_or(cost, |b| b.min(cost)))),
        };

        Ok(match objective {
            Some(value) => SolveOutcome::Solved(value),
            None => SolveOutcome::Infeasible,
        })
    }
}

/// Greedy cover at `radius`; `None` unless every terminal is served within budget
fn cover_at(instance: &ProblemInstance, radius: f64) -> Option<Vec<usize>> {
    let coverage = CoverageSets::build(&instance.sites, &instance.terminals, radius);
    let unreachable = coverage.unreachable_terminals();
    if !unreachable.is_empty() {
        debug!("{} terminals beyond r={:.3} of every site", unreachable.len(), radius);
        return None;
    }

    let state = select_greedy(&coverage, instance.params.site_budget);
    if state.uncovered() > 0 {
        debug!(
            "Budget of {} sites leaves {} terminals uncovered at r={:.3}",
            instance.params.site_budget,
            state.uncovered(),
            radius
        );
        return None;
    }

    Some(state.selected().to_vec())
}

/// Evenly spaced radii from `min` to `max`, both ends included
fn radius_ladder(min: f64, max: f64) -> impl Iterator<Item = f64> {
    let step = (max - min) / (RADIUS_LADDER_STEPS - 1) as f64;
    (0..RADIUS_LADDER_STEPS).map(move |i| {
        if i == RADIUS_LADDER_STEPS - 1 {
            max
        } else {
            min + step * i as f64
        }
    })
}

/// `Σ P_min/r_min²·Rᵢ` with each Rᵢ floored at r_min²; idle sites are switched off
fn variable_radius_cost(instance: &ProblemInstance, active: &[usize]) -> f64 {
    let params = &instance.params;
    let min_sq = params.min_radius * params.min_radius;

    serving_radii_sq(&instance.sites, &instance.terminals, active)
        .iter()
        .flatten()
        .map(|r_sq| params.power_unit / min_sq * r_sq.max(min_sq))
        .sum()
}

/// Squared radius each active site needs once every terminal is attached to
/// its nearest active site. `None` for a site that ends up serving nobody.
fn serving_radii_sq(sites: &[Point], terminals: &[Point], active: &[usize]) -> Vec<Option<f64>> {
    let mut radii: Vec<Option<f64>> = vec![None; active.len()];

    for terminal in terminals {
        let nearest = active
            .iter()
            .enumerate()
            .map(|(slot, &site)| (slot, sites[site].distance_sq(terminal)))
            .fold(None, |best: Option<(usize, f64)>, (slot, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((slot, d)),
            });

        if let Some((slot, d)) = nearest {
            radii[slot] = Some(radii[slot].map_or(d, |r: f64| r.max(d)));
        }
    }

    radii
}
