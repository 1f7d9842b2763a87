//! Orbit utilities: Kepler element conversion, two-body propagation, and conic helpers.

pub mod elements;
pub mod kepler;

pub use elements::{
    OrbitalElements, SeedElements, kepler_to_state, kepler_to_state_with, orbit_from_elements,
    propagate_orbital_elements, propagate_orbital_elements_with, state_to_kepler,
};
pub use kepler::KeplerSolver;

use orrery_core::VectorError;
use thiserror::Error;

/// Errors raised while converting or propagating orbital elements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("near-parabolic orbit (e = {e}) has no finite semi-major axis")]
    Parabolic { e: f64 },
    #[error("kepler equation did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// Speed from the vis-viva relation at distance `r` on an orbit of semi-major axis `a`.
pub fn vis_viva_speed(mu: f64, r: f64, a: f64) -> f64 {
    (mu * (2.0 / r - 1.0 / a)).abs().sqrt()
}

/// Escape speed at distance `r` from a body with gravitational parameter `mu`.
pub fn escape_speed(mu: f64, r: f64) -> f64 {
    (2.0 * mu / r).sqrt()
}

pub fn periapsis(a: f64, e: f64) -> f64 {
    a * (1.0 - e)
}

/// Apoapsis distance; infinite for open orbits.
pub fn apoapsis(a: f64, e: f64) -> f64 {
    if e >= 1.0 { f64::INFINITY } else { a * (1.0 + e) }
}

pub fn semi_minor_axis(a: f64, e: f64) -> f64 {
    a * (1.0 - e * e).abs().sqrt()
}
