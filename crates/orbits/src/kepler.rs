//! Newton–Raphson solutions of Kepler's equation.

use std::f64::consts::PI;

use orrery_core::angle::wrap_two_pi;
use tracing::debug;

use crate::OrbitError;

/// Tunables for the Kepler-equation root finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    /// Stop once the Newton step falls below this (radians).
    pub tolerance: f64,
    /// Give up with `NonConvergence` after this many steps.
    pub max_iterations: usize,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 100,
        }
    }
}

impl KeplerSolver {
    /// Solve `M = E - e sin E` for the eccentric anomaly, returned in `[0, 2π)`.
    ///
    /// Seeded at `M`; highly eccentric orbits start from `π` instead, where an
    /// `M` seed can overshoot on the first step.
    pub fn eccentric_anomaly(&self, mean_anomaly: f64, e: f64) -> Result<f64, OrbitError> {
        let m = wrap_two_pi(mean_anomaly);
        let mut ecc = if e < 0.8 { m } else { PI };

        for iteration in 0..self.max_iterations {
            let f = ecc - e * ecc.sin() - m;
            let f_prime = 1.0 - e * ecc.cos();
            let delta = f / f_prime;
            ecc -= delta;

            if delta.abs() < self.tolerance {
                debug!(iteration, e, "eccentric anomaly converged");
                return Ok(wrap_two_pi(ecc));
            }
        }

        Err(OrbitError::NonConvergence {
            iterations: self.max_iterations,
        })
    }

    /// Solve `M = e sinh F - F` for the hyperbolic anomaly.
    pub fn hyperbolic_anomaly(&self, mean_anomaly: f64, e: f64) -> Result<f64, OrbitError> {
        let mut f = (mean_anomaly / e).asinh();

        for iteration in 0..self.max_iterations {
            let g = e * f.sinh() - f - mean_anomaly;
            let g_prime = e * f.cosh() - 1.0;
            let delta = g / g_prime;
            f -= delta;

            if delta.abs() < self.tolerance {
                debug!(iteration, e, "hyperbolic anomaly converged");
                return Ok(f);
            }
        }

        Err(OrbitError::NonConvergence {
            iterations: self.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eccentric_anomaly_satisfies_kepler_equation() {
        let solver = KeplerSolver::default();
        for &e in &[0.0, 0.1, 0.5, 0.9, 0.99] {
            for &m in &[0.1, 1.0, 2.5, 4.0, 6.0] {
                let ecc = solver.eccentric_anomaly(m, e).unwrap();
                let residual = wrap_two_pi(ecc - e * ecc.sin()) - m;
                assert!(residual.abs() < 1e-9, "e={e} m={m} residual={residual}");
            }
        }
    }

    #[test]
    fn hyperbolic_anomaly_satisfies_kepler_equation() {
        let solver = KeplerSolver::default();
        for &e in &[1.1, 2.0, 5.0] {
            for &m in &[-10.0, -0.5, 0.0, 0.7, 25.0] {
                let f = solver.hyperbolic_anomaly(m, e).unwrap();
                assert!((e * f.sinh() - f - m).abs() < 1e-8, "e={e} m={m}");
            }
        }
    }

    #[test]
    fn starved_iteration_budget_reports_non_convergence() {
        let solver = KeplerSolver {
            tolerance: 1e-15,
            max_iterations: 1,
        };
        let err = solver.eccentric_anomaly(2.0, 0.9).unwrap_err();
        assert_eq!(err, OrbitError::NonConvergence { iterations: 1 });
    }
}
