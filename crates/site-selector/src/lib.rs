//! Antenna Site Selector
//!
//! Lays out a square grid of candidate antenna sites, scatters terminals over
//! it, derives which terminals each site can serve, and picks a budgeted set
//! of active sites that covers as many terminals as possible.
//!
//! # Coverage Model
//!
//! ```text
//! covers(i, j)  ⇔  (xᵢ - xⱼ)² + (yᵢ - yⱼ)² ≤ r²
//! ```
//!
//! | Constant | Default | Description |
//! |----------|---------|-------------|
//! | k        | 11      | Grid side (k² candidate sites) |
//! | r_min    | 0.75    | Serving radius of the greedy model |
//! | r_max    | 7.5     | Upper radius bound of the solver formulations |
//! | A_max    | 30      | Active site budget |
//! | P_min    | 1.0     | Per-site power unit |
//!
//! # Pipeline
//!
//! 1. [`geometry`] builds the site grid and draws terminals from a seeded source
//! 2. [`coverage`] maps each site to the terminals within the radius
//! 3. [`selector`] runs the greedy marginal-gain selection
//! 4. [`model`] is the seam for exact solver backends, [`heuristic`] a solver-free stand-in

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod coverage;
pub mod geometry;
pub mod heuristic;
pub mod model;
pub mod selector;

pub use coverage::CoverageSets;
pub use geometry::{CandidateSite, Geometry, Terminal};
pub use heuristic::GreedyCoverModel;
pub use model::{Formulation, ModelParams, OptimizationModel, ProblemInstance, SolveOutcome};
pub use selector::{select_greedy, SelectionState};

/// Grid side length (k)
pub const DEFAULT_GRID_SIDE: usize = 11;

/// Serving radius used by the greedy model (r_min)
pub const DEFAULT_COVERAGE_RADIUS: f64 = 0.75;

/// Upper radius bound used by the solver formulations (r_max)
pub const DEFAULT_MAX_RADIUS: f64 = 7.5;

/// Maximum number of simultaneously active sites (A_max)
pub const DEFAULT_SITE_BUDGET: usize = 30;

/// Power unit per active site (P_min)
pub const DEFAULT_POWER_UNIT: f64 = 1.0;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Solver backend failed: {0}")]
    Backend(String),
    #[error("Invalid problem instance: {0}")]
    InvalidInstance(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// A position on the coverage plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance. Coverage tests compare against r² so no sqrt is taken.
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Whether `other` lies within `radius` of this point (boundary inclusive)
    pub fn within(&self, other: &Point, radius: f64) -> bool {
        self.distance_sq(other) <= radius * radius
    }
}
