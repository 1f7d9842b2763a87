//! Conversion between Cartesian state and classical Kepler elements.
//!
//! Angles are radians. Ellipses keep all anomalies in `[0, 2π)`. Hyperbolas
//! (`e > 1`, `a < 0`) store the hyperbolic anomaly `F` in `ecc_anom`, the
//! unwrapped hyperbolic mean anomaly `e sinh F - F` in `mean_anom`, and a
//! signed true anomaly in `(-π, π)`.

use std::f64::consts::{PI, TAU};

use orrery_core::angle::{round_to, wrap_two_pi};
use orrery_core::{Mass, StateVector, Vector3};
use serde::{Deserialize, Serialize};

use crate::kepler::KeplerSolver;
use crate::{OrbitError, apoapsis, periapsis};

/// Below this eccentricity the orbit is treated as circular.
const CIRCULAR_EPS: f64 = 1e-10;
/// Below this ratio `|n| / |h|` the orbit is treated as equatorial.
const EQUATORIAL_EPS: f64 = 1e-10;
/// Eccentricities this close to 1 are rejected as parabolic.
const PARABOLIC_EPS: f64 = 1e-9;
/// `|r × v| / (|r| |v|)` below this means rectilinear motion.
const RECTILINEAR_EPS: f64 = 1e-12;

/// Classical Kepler elements of a two-body orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis; negative on the hyperbolic branch.
    pub a: f64,
    pub e: f64,
    pub i: f64,
    /// Argument of periapsis.
    pub arg_p: f64,
    /// Longitude of the ascending node.
    pub l_an: f64,
    pub true_anom: f64,
    pub ecc_anom: f64,
    pub mean_anom: f64,
}

impl OrbitalElements {
    pub fn is_hyperbolic(&self) -> bool {
        self.e > 1.0
    }

    /// `sqrt(mu / |a|³)`, valid on both branches.
    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.a.abs().powi(3)).sqrt()
    }

    /// Orbital period, or `None` for open orbits.
    pub fn period(&self, mu: f64) -> Option<f64> {
        if self.is_hyperbolic() {
            None
        } else {
            Some(TAU / self.mean_motion(mu))
        }
    }

    pub fn periapsis(&self) -> f64 {
        periapsis(self.a, self.e)
    }

    pub fn apoapsis(&self) -> f64 {
        apoapsis(self.a, self.e)
    }

    /// Copy rounded to `decimals` places, for display and export only.
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            a: round_to(self.a, decimals),
            e: round_to(self.e, decimals),
            i: round_to(self.i, decimals),
            arg_p: round_to(self.arg_p, decimals),
            l_an: round_to(self.l_an, decimals),
            true_anom: round_to(self.true_anom, decimals),
            ecc_anom: round_to(self.ecc_anom, decimals),
            mean_anom: round_to(self.mean_anom, decimals),
        }
    }
}

/// Scenario seed elements; angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeedElements {
    pub a: f64,
    pub e: f64,
    /// Inclination.
    pub i: f64,
    /// Argument of periapsis.
    pub w: f64,
    /// Longitude of the ascending node.
    pub o: f64,
}

/// Signed angle from `from` to `to`, measured about `normal`, in `[0, 2π)`.
fn angle_in_plane(from: Vector3, to: Vector3, normal: Vector3) -> f64 {
    wrap_two_pi(from.cross(to).dot(normal).atan2(from.dot(to)))
}

fn check_mu(mu: f64) -> Result<(), OrbitError> {
    if mu > 0.0 && mu.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::DegenerateGeometry(
            "gravitational parameter must be positive",
        ))
    }
}

fn check_shape(a: f64, e: f64) -> Result<(), OrbitError> {
    if !(e >= 0.0) || !a.is_finite() {
        return Err(OrbitError::DegenerateGeometry("invalid conic shape"));
    }
    if (e - 1.0).abs() < PARABOLIC_EPS {
        return Err(OrbitError::Parabolic { e });
    }
    if (e < 1.0 && a <= 0.0) || (e > 1.0 && a >= 0.0) {
        return Err(OrbitError::DegenerateGeometry(
            "semi-major axis sign does not match eccentricity",
        ));
    }
    Ok(())
}

/// Convert a state relative to the primary into Kepler elements.
pub fn state_to_kepler(
    relative_position: Vector3,
    relative_velocity: Vector3,
    mu: f64,
) -> Result<OrbitalElements, OrbitError> {
    check_mu(mu)?;
    let r = relative_position;
    let v = relative_velocity;
    let r_mag = r.norm();
    if r_mag == 0.0 || !r.is_finite() || !v.is_finite() {
        return Err(OrbitError::DegenerateGeometry("zero or non-finite relative position"));
    }

    let v2 = v.norm_squared();
    let h = r.cross(v);
    let h_mag = h.norm();
    if h_mag == 0.0 || h_mag <= RECTILINEAR_EPS * r_mag * v2.sqrt() {
        return Err(OrbitError::DegenerateGeometry(
            "rectilinear motion has no orbital plane",
        ));
    }
    let h_hat = h.scaled(1.0 / h_mag);

    let e_vec = r
        .scaled(v2 - mu / r_mag)
        .minus(v.scaled(r.dot(v)))
        .scaled(1.0 / mu);
    let e = e_vec.norm();
    if (e - 1.0).abs() < PARABOLIC_EPS {
        return Err(OrbitError::Parabolic { e });
    }

    let energy = 0.5 * v2 - mu / r_mag;
    let a = -mu / (2.0 * energy);
    let i = (h.z / h_mag).clamp(-1.0, 1.0).acos();

    let node = Vector3::Z.cross(h);
    let equatorial = node.norm() <= EQUATORIAL_EPS * h_mag;
    let circular = e < CIRCULAR_EPS;

    // Equatorial orbits have no node line; angles are measured from the x axis.
    let (l_an, reference) = if equatorial {
        (0.0, Vector3::X)
    } else {
        (wrap_two_pi(node.y.atan2(node.x)), node)
    };

    // Circular orbits have no periapsis; phase is measured from the reference
    // direction to the position vector (argument of latitude / true longitude).
    let (arg_p, true_anom) = if circular {
        (0.0, angle_in_plane(reference, r, h_hat))
    } else {
        (
            angle_in_plane(reference, e_vec, h_hat),
            angle_in_plane(e_vec, r, h_hat),
        )
    };

    let (true_anom, ecc_anom, mean_anom) = if e < 1.0 {
        let ecc_anom = eccentric_from_true(true_anom, e);
        (true_anom, ecc_anom, wrap_two_pi(ecc_anom - e * ecc_anom.sin()))
    } else {
        let signed = if true_anom > PI { true_anom - TAU } else { true_anom };
        let hyp_anom = ((e * e - 1.0).sqrt() * signed.sin() / (1.0 + e * signed.cos())).asinh();
        (signed, hyp_anom, e * hyp_anom.sinh() - hyp_anom)
    };

    Ok(OrbitalElements {
        a,
        e,
        i,
        arg_p,
        l_an,
        true_anom,
        ecc_anom,
        mean_anom,
    })
}

fn eccentric_from_true(true_anom: f64, e: f64) -> f64 {
    wrap_two_pi(((1.0 - e * e).sqrt() * true_anom.sin()).atan2(e + true_anom.cos()))
}

fn true_from_eccentric(ecc_anom: f64, e: f64) -> f64 {
    wrap_two_pi(((1.0 - e * e).sqrt() * ecc_anom.sin()).atan2(ecc_anom.cos() - e))
}

fn true_from_hyperbolic(hyp_anom: f64, e: f64) -> f64 {
    2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (0.5 * hyp_anom).tanh()).atan()
}

/// Convert elements back to a state relative to the primary.
///
/// Kepler's equation is solved from `mean_anom`; the stored true and
/// eccentric anomalies are not trusted.
pub fn kepler_to_state(elements: &OrbitalElements, mu: f64) -> Result<StateVector, OrbitError> {
    kepler_to_state_with(elements, mu, &KeplerSolver::default())
}

pub fn kepler_to_state_with(
    elements: &OrbitalElements,
    mu: f64,
    solver: &KeplerSolver,
) -> Result<StateVector, OrbitError> {
    check_mu(mu)?;
    let OrbitalElements { a, e, .. } = *elements;
    check_shape(a, e)?;

    let (true_anom, radius) = if e < 1.0 {
        let ecc_anom = solver.eccentric_anomaly(elements.mean_anom, e)?;
        (
            true_from_eccentric(ecc_anom, e),
            a * (1.0 - e * ecc_anom.cos()),
        )
    } else {
        let hyp_anom = solver.hyperbolic_anomaly(elements.mean_anom, e)?;
        (
            true_from_hyperbolic(hyp_anom, e),
            a * (1.0 - e * hyp_anom.cosh()),
        )
    };

    let semi_latus = a * (1.0 - e * e);
    let speed_scale = (mu / semi_latus).sqrt();
    let (sin_nu, cos_nu) = true_anom.sin_cos();

    let mut position = Vector3::new(radius * cos_nu, radius * sin_nu, 0.0);
    let mut velocity = Vector3::new(-speed_scale * sin_nu, speed_scale * (e + cos_nu), 0.0);

    position
        .rotate_radians(Vector3::Z, elements.arg_p)?
        .rotate_radians(Vector3::X, elements.i)?
        .rotate_radians(Vector3::Z, elements.l_an)?;
    velocity
        .rotate_radians(Vector3::Z, elements.arg_p)?
        .rotate_radians(Vector3::X, elements.i)?
        .rotate_radians(Vector3::Z, elements.l_an)?;

    Ok(StateVector { position, velocity })
}

/// Advance the orbital phase by `dt` under two-body motion.
///
/// Only the anomalies change. Elliptic mean anomaly wraps into `[0, 2π)`.
pub fn propagate_orbital_elements(
    elements: &OrbitalElements,
    dt: f64,
    mu: f64,
) -> Result<OrbitalElements, OrbitError> {
    propagate_orbital_elements_with(elements, dt, mu, &KeplerSolver::default())
}

pub fn propagate_orbital_elements_with(
    elements: &OrbitalElements,
    dt: f64,
    mu: f64,
    solver: &KeplerSolver,
) -> Result<OrbitalElements, OrbitError> {
    check_mu(mu)?;
    check_shape(elements.a, elements.e)?;
    let e = elements.e;
    let mean_motion = elements.mean_motion(mu);

    let (mean_anom, ecc_anom, true_anom) = if e < 1.0 {
        let mean_anom = wrap_two_pi(elements.mean_anom + mean_motion * dt);
        let ecc_anom = solver.eccentric_anomaly(mean_anom, e)?;
        (mean_anom, ecc_anom, true_from_eccentric(ecc_anom, e))
    } else {
        let mean_anom = elements.mean_anom + mean_motion * dt;
        let hyp_anom = solver.hyperbolic_anomaly(mean_anom, e)?;
        (mean_anom, hyp_anom, true_from_hyperbolic(hyp_anom, e))
    };

    Ok(OrbitalElements {
        true_anom,
        ecc_anom,
        mean_anom,
        ..*elements
    })
}

/// Absolute state of a body seeded from elements about `primary`.
///
/// The body is placed at apoapsis, matching how element-defined scenario
/// bodies are bootstrapped.
pub fn orbit_from_elements(
    primary: &Mass,
    seed: &SeedElements,
    mu: f64,
) -> Result<StateVector, OrbitError> {
    let elements = OrbitalElements {
        a: seed.a,
        e: seed.e,
        i: seed.i.to_radians(),
        arg_p: seed.w.to_radians(),
        l_an: seed.o.to_radians(),
        true_anom: PI,
        ecc_anom: PI,
        mean_anom: PI,
    };
    let relative = kepler_to_state(&elements, mu)?;

    Ok(StateVector {
        position: primary.position.plus(relative.position),
        velocity: primary.velocity.plus(relative.velocity),
    })
}
