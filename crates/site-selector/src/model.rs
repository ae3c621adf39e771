//! Solver backend seam
//!
//! Exact placement formulations are solved outside this crate. A backend
//! receives the trial geometry plus the four model constants and hands back
//! an objective value or an infeasibility signal; nothing else crosses the
//! boundary.

use crate::geometry::Geometry;
use crate::{
    ModelError, Point, Result, DEFAULT_COVERAGE_RADIUS, DEFAULT_MAX_RADIUS, DEFAULT_POWER_UNIT,
    DEFAULT_SITE_BUDGET,
};
use serde::{Deserialize, Serialize};

/// Which placement problem the backend is asked to solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formulation {
    /// Minimize `100·P_min·|active|`; every site serves out to r_max
    FixedPower,
    /// Minimize `Σ P_min/r_min²·Rᵢ` over active sites, Rᵢ ∈ [r_min², r_max²]
    VariableRadius,
}

/// Model constants shared by every formulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// A_max
    pub site_budget: usize,
    /// P_min
    pub power_unit: f64,
    /// r_min
    pub min_radius: f64,
    /// r_max
    pub max_radius: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            site_budget: DEFAULT_SITE_BUDGET,
            power_unit: DEFAULT_POWER_UNIT,
            min_radius: DEFAULT_COVERAGE_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
        }
    }
}

/// Everything a backend needs for one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInstance {
    pub formulation: Formulation,
    pub sites: Vec<Point>,
    pub terminals: Vec<Point>,
    pub params: ModelParams,
}

impl ProblemInstance {
    pub fn from_geometry(geometry: &Geometry, formulation: Formulation, params: ModelParams) -> Self {
        Self {
            formulation,
            sites: geometry.site_positions(),
            terminals: geometry.terminal_positions(),
            params,
        }
    }

    /// Reject radius bounds and power units no backend could honour
    pub fn validate(&self) -> Result<()> {
        let p = &self.params;
        if !(p.min_radius.is_finite() && p.min_radius > 0.0) {
            return Err(ModelError::InvalidInstance(format!("r_min must be positive, got {}", p.min_radius)));
        }
        if !(p.max_radius.is_finite() && p.max_radius >= p.min_radius) {
            return Err(ModelError::InvalidInstance(format!(
                "r_max must be finite and >= r_min ({}), got {}",
                p.min_radius, p.max_radius
            )));
        }
        if !(p.power_unit.is_finite() && p.power_unit >= 0.0) {
            return Err(ModelError::InvalidInstance(format!("P_min must be non-negative, got {}", p.power_unit)));
        }
        Ok(())
    }
}

/// What a backend reports for one instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolveOutcome {
    Solved(f64),
    Infeasible,
}

impl SolveOutcome {
    pub fn objective(&self) -> Option<f64> {
        match self {
            Self::Solved(value) => Some(*value),
            Self::Infeasible => None,
        }
    }
}

/// A placement solver.
///
/// `Err` means the backend itself broke; an instance with no feasible
/// placement is `Ok(SolveOutcome::Infeasible)`.
pub trait OptimizationModel: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, instance: &ProblemInstance) -> Result<SolveOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn instance(params: ModelParams) -> ProblemInstance {
        let geometry = Geometry::generate(3, 4, &mut StdRng::seed_from_u64(5));
        ProblemInstance::from_geometry(&geometry, Formulation::FixedPower, params)
    }

    #[test]
    fn test_from_geometry_copies_positions() {
        let geometry = Geometry::generate(4, 6, &mut StdRng::seed_from_u64(9));
        let inst = ProblemInstance::from_geometry(&geometry, Formulation::VariableRadius, ModelParams::default());
        assert_eq!(inst.sites.len(), 16);
        assert_eq!(inst.terminals, geometry.terminal_positions());
        assert_eq!(inst.formulation, Formulation::VariableRadius);
    }

    #[test]
    fn test_default_params_validate() {
        assert!(instance(ModelParams::default()).validate().is_ok());
    }

    #[test]
    fn test_inverted_radii_rejected() {
        let params = ModelParams {
            min_radius: 2.0,
            max_radius: 1.0,
            ..ModelParams::default()
        };
        assert!(matches!(instance(params).validate(), Err(ModelError::InvalidInstance(_))));
    }

    #[test]
    fn test_zero_min_radius_rejected() {
        let params = ModelParams {
            min_radius: 0.0,
            ..ModelParams::default()
        };
        assert!(instance(params).validate().is_err());
    }

    #[test]
    fn test_outcome_objective() {
        assert_eq!(SolveOutcome::Solved(3.5).objective(), Some(3.5));
        assert_eq!(SolveOutcome::Infeasible.objective(), None);
    }
}
