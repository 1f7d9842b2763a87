//! Core units, constants, and shared primitives for the Orrery workspace.
//!
//! Scenario quantities use the simulation's native units: astronomical units,
//! years, and solar masses, with `g` supplied by the scenario.

pub mod mass;
pub mod vector;

pub use mass::{Mass, StateVector, barycenter};
pub use vector::{Vector3, VectorError};

/// Physical constants expressed in simulation units (unless stated otherwise).
pub mod constants {
    /// Gravitational constant used by the stock scenarios (AU³ M☉⁻¹ yr⁻²).
    pub const G_AU3_MSUN_YR2: f64 = 39.5;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Days per Julian year.
    pub const DAYS_PER_YEAR: f64 = 365.25;
}

/// Unit conversions used at presentation boundaries.
pub mod units {
    use super::constants::{AU_KM, DAYS_PER_YEAR, SECONDS_PER_DAY};

    /// Convert AU per year to kilometres per second.
    #[inline]
    pub fn au_yr_to_km_s(v: f64) -> f64 {
        v * AU_KM / (DAYS_PER_YEAR * SECONDS_PER_DAY)
    }
}

/// Angle wrapping shared by the element converter and the Lambert solver.
pub mod angle {
    use std::f64::consts::TAU;

    /// Wrap an angle into `[0, 2π)`.
    #[inline]
    pub fn wrap_two_pi(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// Round to a fixed number of decimals. Presentation only.
    #[inline]
    pub fn round_to(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals as i32);
        (value * factor).round() / factor
    }
}
