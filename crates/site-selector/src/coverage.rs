//! Per-site coverage sets

use crate::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// For every site, the ascending ids of the terminals it can serve.
///
/// Built once per trial and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSets {
    radius: f64,
    terminal_count: usize,
    sets: Vec<Vec<usize>>,
}

impl CoverageSets {
    /// Exact squared-distance test for every (site, terminal) pair
    pub fn build(sites: &[Point], terminals: &[Point], radius: f64) -> Self {
        let radius_sq = radius * radius;

        let sets: Vec<Vec<usize>> = sites
            .iter()
            .map(|site| {
                terminals
                    .iter()
                    .enumerate()
                    .filter(|(_, terminal)| site.distance_sq(terminal) <= radius_sq)
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect();

        debug!(
            "Built coverage for {} sites x {} terminals at r={:.3} ({} links)",
            sites.len(),
            terminals.len(),
            radius,
            sets.iter().map(Vec::len).sum::<usize>()
        );

        Self {
            radius,
            terminal_count: terminals.len(),
            sets,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn site_count(&self) -> usize {
        self.sets.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    /// Terminals served by `site`; empty for an unknown site
    pub fn terminals_of(&self, site: usize) -> &[usize] {
        self.sets.get(site).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn covers(&self, site: usize, terminal: usize) -> bool {
        self.terminals_of(site).binary_search(&terminal).is_ok()
    }

    /// (site id, served terminals) in ascending site order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.sets.iter().enumerate().map(|(i, s)| (i, s.as_slice()))
    }

    /// Terminals that no site can reach at this radius
    pub fn unreachable_terminals(&self) -> Vec<usize> {
        let mut reachable = vec![false; self.terminal_count];
        for set in &self.sets {
            for &j in set {
                reachable[j] = true;
            }
        }
        reachable
            .iter()
            .enumerate()
            .filter(|(_, &r)| !r)
            .map(|(j, _)| j)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(k: usize) -> Vec<Point> {
        (0..k * k)
            .map(|i| Point::new((i % k) as f64, (i / k) as f64))
            .collect()
    }

    #[test]
    fn test_coverage_matches_brute_force() {
        let sites = grid(3);
        let terminals = vec![
            Point::new(0.1, 0.1),
            Point::new(1.5, 1.5),
            Point::new(2.0, 2.0),
            Point::new(0.9, 0.0),
        ];
        let coverage = CoverageSets::build(&sites, &terminals, 0.75);

        for (i, site) in sites.iter().enumerate() {
            for (j, terminal) in terminals.iter().enumerate() {
                assert_eq!(coverage.covers(i, j), site.within(terminal, 0.75), "site {} terminal {}", i, j);
            }
        }
        assert_eq!(coverage.terminals_of(0), &[0]);
        assert_eq!(coverage.terminals_of(1), &[3]);
        assert_eq!(coverage.terminals_of(8), &[1, 2]);
    }

    #[test]
    fn test_boundary_distance_is_covered() {
        let sites = vec![Point::new(0.0, 0.0)];
        let terminals = vec![Point::new(0.75, 0.0), Point::new(0.7500001, 0.0)];
        let coverage = CoverageSets::build(&sites, &terminals, 0.75);
        assert_eq!(coverage.terminals_of(0), &[0]);
    }

    #[test]
    fn test_unknown_site_is_empty() {
        let coverage = CoverageSets::build(&grid(2), &[Point::new(0.0, 0.0)], 0.5);
        assert!(coverage.terminals_of(99).is_empty());
        assert!(!coverage.covers(99, 0));
    }

    #[test]
    fn test_unreachable_terminals() {
        let sites = vec![Point::new(0.0, 0.0)];
        let terminals = vec![Point::new(0.2, 0.2), Point::new(5.0, 5.0)];
        let coverage = CoverageSets::build(&sites, &terminals, 1.0);
        assert_eq!(coverage.unreachable_terminals(), vec![1]);
        assert_eq!(coverage.terminal_count(), 2);
        assert_eq!(coverage.site_count(), 1);
    }
}
