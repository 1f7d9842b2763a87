#![allow(dead_code)]

use orrery::core::{Mass, Vector3};
use orrery::transfer::{SimulationContext, TrajectorySettings};

pub const G: f64 = 39.5;

/// Body on a circular orbit of radius `r` about `primary`, at angle `theta` in the ecliptic.
pub fn circular(name: &str, m: f64, primary: &Mass, r: f64, theta: f64) -> Mass {
    let speed = (G * primary.m / r).sqrt();
    Mass::new(
        name,
        m,
        primary
            .position
            .plus(Vector3::new(r * theta.cos(), r * theta.sin(), 0.0)),
        primary
            .velocity
            .plus(Vector3::new(-speed * theta.sin(), speed * theta.cos(), 0.0)),
    )
}

/// Spacecraft near Earth, Earth, Mars at 40°, and a Sun that is neither at
/// the origin nor at rest, so re-centring is observable.
pub fn inner_system() -> SimulationContext {
    let sun = Mass::new(
        "Sun",
        1.0,
        Vector3::new(0.1, -0.2, 0.0),
        Vector3::new(0.3, 0.0, 0.0),
    );
    let earth = circular("Earth", 3.003e-6, &sun, 1.0, 0.0);
    let mars = circular("Mars", 3.227e-7, &sun, 1.524, 40f64.to_radians());
    let spacecraft = circular("Spacecraft", 1e-20, &sun, 1.0, 0.05);

    let mut ctx = SimulationContext::new("Inner", G, vec![spacecraft, sun, earth, mars]);
    ctx.trajectory = Some(TrajectorySettings {
        target: "Mars".into(),
        arrival_offset: 0.7,
        min_tof: None,
        max_tof: None,
    });
    ctx
}
