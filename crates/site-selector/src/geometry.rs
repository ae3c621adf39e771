//! Site grid construction and terminal placement

use crate::Point;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A fixed candidate antenna location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateSite {
    /// Row-major index in [0, k²)
    pub id: usize,
    pub position: Point,
}

/// A randomly placed device that needs coverage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: usize,
    pub position: Point,
}

/// Sites and terminals of one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub grid_side: usize,
    pub sites: Vec<CandidateSite>,
    pub terminals: Vec<Terminal>,
}

impl Geometry {
    /// Build the k×k grid and draw `terminal_count` terminals from `rng`
    pub fn generate<R: Rng + ?Sized>(grid_side: usize, terminal_count: usize, rng: &mut R) -> Self {
        Self {
            grid_side,
            sites: site_grid(grid_side),
            terminals: draw_terminals(grid_side, terminal_count, rng),
        }
    }

    pub fn site_positions(&self) -> Vec<Point> {
        self.sites.iter().map(|s| s.position).collect()
    }

    pub fn terminal_positions(&self) -> Vec<Point> {
        self.terminals.iter().map(|t| t.position).collect()
    }
}

/// Candidate sites on a unit-spaced grid; site `i` sits at `(i mod k, i div k)`
pub fn site_grid(grid_side: usize) -> Vec<CandidateSite> {
    (0..grid_side * grid_side)
        .map(|id| CandidateSite {
            id,
            position: Point::new((id % grid_side) as f64, (id / grid_side) as f64),
        })
        .collect()
}

/// Terminals uniform over [0, k-1]², x drawn before y, in id order
pub fn draw_terminals<R: Rng + ?Sized>(grid_side: usize, count: usize, rng: &mut R) -> Vec<Terminal> {
    let extent = grid_side.saturating_sub(1) as f64;
    let uniform = Uniform::new_inclusive(0.0, extent);

    (0..count)
        .map(|id| {
            let x = uniform.sample(rng);
            let y = uniform.sample(rng);
            Terminal {
                id,
                position: Point::new(x, y),
            }
        })
        .collect()
}
