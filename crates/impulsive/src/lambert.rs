//! Single-revolution Lambert solver in universal variables.
//!
//! The free parameter is `ψ = Δχ² / a`; time of flight grows monotonically with
//! `ψ` on a single revolution, so a bisection bracketed by `[-4π², 4π²)`
//! always closes on the requested time when a solution exists.

use std::f64::consts::PI;

use orrery_core::{Mass, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Below this `|r1 × r2| / (r1 r2)` the transfer plane is undefined.
const COLLINEAR_EPS: f64 = 1e-12;
/// Series expansion threshold for the Stumpff functions.
const STUMPFF_SERIES: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LambertSolverError {
    #[error("degenerate lambert geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("lambert solver did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
}

/// Which of the two single-revolution arcs to fly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Transfer angle below π.
    ShortWay,
    /// Transfer angle above π.
    LongWay,
}

impl Branch {
    /// The branch that sweeps from `r1` to `r2` counter-clockwise about `normal`.
    pub fn prograde(r1: Vector3, r2: Vector3, normal: Vector3) -> Self {
        if r1.cross(r2).dot(normal) >= 0.0 {
            Branch::ShortWay
        } else {
            Branch::LongWay
        }
    }

    fn direction(self) -> f64 {
        match self {
            Branch::ShortWay => 1.0,
            Branch::LongWay => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertSettings {
    /// Relative time-of-flight tolerance.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for LambertSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LambertSolution {
    pub init_vel: Vector3,
    pub final_vel: Vector3,
    pub branch: Branch,
    pub iterations: usize,
    pub psi: f64,
}

/// Stumpff functions `C(ψ)` and `S(ψ)`.
fn stumpff(psi: f64) -> (f64, f64) {
    if psi > STUMPFF_SERIES {
        let s = psi.sqrt();
        ((1.0 - s.cos()) / psi, (s - s.sin()) / s.powi(3))
    } else if psi < -STUMPFF_SERIES {
        let s = (-psi).sqrt();
        ((s.cosh() - 1.0) / -psi, (s.sinh() - s) / s.powi(3))
    } else {
        (
            0.5 - psi / 24.0 + psi * psi / 720.0,
            1.0 / 6.0 - psi / 120.0 + psi * psi / 5040.0,
        )
    }
}

fn check_geometry(r1: Vector3, r2: Vector3, tof: f64, mu: f64) -> Result<(), LambertSolverError> {
    if !tof.is_finite() || tof <= 0.0 {
        return Err(LambertSolverError::DegenerateGeometry(
            "time of flight must be positive and finite",
        ));
    }
    if !mu.is_finite() || mu <= 0.0 {
        return Err(LambertSolverError::DegenerateGeometry(
            "gravitational parameter must be positive",
        ));
    }
    let (r1m, r2m) = (r1.norm(), r2.norm());
    if r1m == 0.0 || r2m == 0.0 {
        return Err(LambertSolverError::DegenerateGeometry("zero position vector"));
    }
    if r1.distance_to(r2) <= f64::EPSILON * r1m.max(r2m) {
        return Err(LambertSolverError::DegenerateGeometry("coincident positions"));
    }
    if r1.cross(r2).norm() <= COLLINEAR_EPS * r1m * r2m {
        return Err(LambertSolverError::DegenerateGeometry(
            "collinear positions leave the transfer plane undefined",
        ));
    }
    Ok(())
}

/// Velocities at `r1` and `r2` for a conic arc covering them in `time_of_flight`.
pub fn solve_positions(
    r1: Vector3,
    r2: Vector3,
    time_of_flight: f64,
    mu: f64,
    branch: Branch,
    settings: &LambertSettings,
) -> Result<LambertSolution, LambertSolverError> {
    check_geometry(r1, r2, time_of_flight, mu)?;

    let (r1m, r2m) = (r1.norm(), r2.norm());
    let cos_dnu = (r1.dot(r2) / (r1m * r2m)).clamp(-1.0, 1.0);
    let a = branch.direction() * (r1m * r2m * (1.0 + cos_dnu)).sqrt();
    let sqrt_mu = mu.sqrt();

    let mut psi = 0.0;
    let mut psi_low = -4.0 * PI * PI;
    let mut psi_up = 4.0 * PI * PI;
    let (mut c, mut s) = stumpff(psi);

    for iteration in 1..=settings.max_iterations {
        let y = r1m + r2m + a * (psi * s - 1.0) / c.sqrt();

        if a > 0.0 && y < 0.0 {
            psi_low = psi;
        } else {
            let chi = (y / c).sqrt();
            let tof = (chi.powi(3) * s + a * y.sqrt()) / sqrt_mu;

            if (tof - time_of_flight).abs() <= settings.tolerance * time_of_flight {
                let f = 1.0 - y / r1m;
                let g = a * (y / mu).sqrt();
                let g_dot = 1.0 - y / r2m;
                if g == 0.0 {
                    return Err(LambertSolverError::DegenerateGeometry(
                        "vanishing lagrange coefficient",
                    ));
                }

                let init_vel = r2.minus(r1.scaled(f)).scaled(1.0 / g);
                let final_vel = r2.scaled(g_dot).minus(r1).scaled(1.0 / g);
                debug!(iteration, psi, ?branch, "lambert solve converged");
                return Ok(LambertSolution {
                    init_vel,
                    final_vel,
                    branch,
                    iterations: iteration,
                    psi,
                });
            }

            if tof <= time_of_flight {
                psi_low = psi;
            } else {
                psi_up = psi;
            }
        }

        psi = 0.5 * (psi_low + psi_up);
        (c, s) = stumpff(psi);
    }

    debug!(psi, psi_low, psi_up, "lambert solve exhausted its iteration budget");
    Err(LambertSolverError::NonConvergence {
        iterations: settings.max_iterations,
    })
}

/// Solve the transfer from `origin`'s position to `target`'s position.
///
/// Both masses must be expressed relative to the same central body, whose
/// gravitational parameter is `mu`.
pub fn plan_flight(
    time_of_flight: f64,
    origin: &Mass,
    target: &Mass,
    mu: f64,
    branch: Branch,
    settings: &LambertSettings,
) -> Result<LambertSolution, LambertSolverError> {
    solve_positions(origin.position, target.position, time_of_flight, mu, branch, settings)
}

/// Array form: returns `(v1, v2)`; `short` selects the short-way arc.
pub fn solve(
    r1: [f64; 3],
    r2: [f64; 3],
    time_of_flight: f64,
    mu: f64,
    short: bool,
) -> Result<([f64; 3], [f64; 3]), LambertSolverError> {
    let branch = if short { Branch::ShortWay } else { Branch::LongWay };
    let solution = solve_positions(
        Vector3::from_array(r1),
        Vector3::from_array(r2),
        time_of_flight,
        mu,
        branch,
        &LambertSettings::default(),
    )?;
    Ok((solution.init_vel.to_array(), solution.final_vel.to_array()))
}
