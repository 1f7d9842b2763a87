//! Analytic estimators for impulsive transfers between circular, coplanar orbits.
//!
//! Units follow the caller: with `mu = g · M` in AU³/yr² the speeds come out
//! in AU/yr and times in years.

use std::f64::consts::PI;

use serde::Serialize;

use crate::lambert::LambertSolverError;

/// Hohmann transfer between circular coplanar orbits of radii `r1` and `r2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HohmannResult {
    /// Signed: negative for an inward (retrograde) departure burn.
    pub dv1: f64,
    /// Signed: negative for a retrograde capture.
    pub dv2: f64,
    pub dv_total: f64,
    pub tof: f64,
    /// Transfer-orbit speed leaving `r1`.
    pub departure_speed: f64,
    /// Transfer-orbit speed arriving at `r2`.
    pub arrival_speed: f64,
    pub transfer_a: f64,
}

fn check_positive(values: &[f64]) -> Result<(), LambertSolverError> {
    if values.iter().all(|v| v.is_finite() && *v > 0.0) {
        Ok(())
    } else {
        Err(LambertSolverError::DegenerateGeometry(
            "radii and gravitational parameter must be positive",
        ))
    }
}

fn circular_speed(mu: f64, r: f64) -> f64 {
    (mu / r).sqrt()
}

/// Speed on a conic of semi-major axis `a` at radius `r`.
fn conic_speed(mu: f64, r: f64, a: f64) -> f64 {
    (mu * (2.0 / r - 1.0 / a)).sqrt()
}

pub fn hohmann(r1: f64, r2: f64, mu: f64) -> Result<HohmannResult, LambertSolverError> {
    check_positive(&[r1, r2, mu])?;

    let transfer_a = 0.5 * (r1 + r2);
    let departure_speed = conic_speed(mu, r1, transfer_a);
    let arrival_speed = conic_speed(mu, r2, transfer_a);

    let dv1 = departure_speed - circular_speed(mu, r1);
    let dv2 = circular_speed(mu, r2) - arrival_speed;

    Ok(HohmannResult {
        dv1,
        dv2,
        dv_total: dv1.abs() + dv2.abs(),
        tof: PI * (transfer_a.powi(3) / mu).sqrt(),
        departure_speed,
        arrival_speed,
        transfer_a,
    })
}

/// Bi-elliptic transfer through an intermediate apoapsis `rb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiEllipticResult {
    pub rb: f64,
    pub dv1: f64,
    pub dv2: f64,
    pub dv3: f64,
    pub dv_total: f64,
    pub tof: f64,
}

/// Evaluates the three burns for a fixed `rb`; `rb` is not optimised.
pub fn bi_elliptic(r1: f64, r2: f64, rb: f64, mu: f64) -> Result<BiEllipticResult, LambertSolverError> {
    check_positive(&[r1, r2, rb, mu])?;

    let outbound_a = 0.5 * (r1 + rb);
    let inbound_a = 0.5 * (rb + r2);

    let dv1 = conic_speed(mu, r1, outbound_a) - circular_speed(mu, r1);
    let dv2 = conic_speed(mu, rb, inbound_a) - conic_speed(mu, rb, outbound_a);
    let dv3 = circular_speed(mu, r2) - conic_speed(mu, r2, inbound_a);

    let half_period = |a: f64| PI * (a.powi(3) / mu).sqrt();

    Ok(BiEllipticResult {
        rb,
        dv1,
        dv2,
        dv3,
        dv_total: dv1.abs() + dv2.abs() + dv3.abs(),
        tof: half_period(outbound_a) + half_period(inbound_a),
    })
}
