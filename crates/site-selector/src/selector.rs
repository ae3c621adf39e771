//! Budgeted greedy maximum-coverage selection
//!
//! Each round picks the site that newly covers the most terminals, lowest id
//! first on ties. The loop ends on budget, on full coverage, or as soon as no
//! remaining site adds anything.

use crate::coverage::CoverageSets;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Active sites and covered terminals of one greedy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Site ids in pick order
    selected: Vec<usize>,
    covered: Vec<bool>,
    covered_count: usize,
}

impl SelectionState {
    pub fn new(terminal_count: usize) -> Self {
        Self {
            selected: Vec::new(),
            covered: vec![false; terminal_count],
            covered_count: 0,
        }
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn is_selected(&self, site: usize) -> bool {
        self.selected.contains(&site)
    }

    pub fn is_covered(&self, terminal: usize) -> bool {
        self.covered.get(terminal).copied().unwrap_or(false)
    }

    pub fn covered_count(&self) -> usize {
        self.covered_count
    }

    pub fn terminal_count(&self) -> usize {
        self.covered.len()
    }

    pub fn uncovered(&self) -> usize {
        self.covered.len() - self.covered_count
    }

    /// Terminals of `set` not yet covered
    pub fn marginal_gain(&self, set: &[usize]) -> usize {
        set.iter().filter(|&&j| !self.covered[j]).count()
    }

    fn activate(&mut self, site: usize, set: &[usize]) {
        self.selected.push(site);
        for &j in set {
            if !self.covered[j] {
                self.covered[j] = true;
                self.covered_count += 1;
            }
        }
    }
}

/// Pick at most `budget` sites maximizing distinct covered terminals
pub fn select_greedy(coverage: &CoverageSets, budget: usize) -> SelectionState {
    let n = coverage.terminal_count();
    let mut state = SelectionState::new(n);

    while state.selected.len() < budget && state.covered_count < n {
        let mut best: Option<(usize, usize)> = None;

        for (site, set) in coverage.iter() {
            if state.is_selected(site) {
                continue;
            }
            let gain = state.marginal_gain(set);
            // Strict comparison keeps the lowest id on ties
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((site, gain));
            }
        }

        let Some((site, gain)) = best else {
            debug!(
                "No site adds coverage, stopping with {} of {} covered",
                state.covered_count, n
            );
            break;
        };

        state.activate(site, coverage.terminals_of(site));
        debug!(
            "Selected site {} (+{}, {}/{} covered)",
            site, gain, state.covered_count, n
        );
    }

    state
}
