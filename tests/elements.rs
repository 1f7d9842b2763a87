use std::f64::consts::PI;

use orrery::core::Vector3;
use orrery::orbits::{
    OrbitError, kepler_to_state, propagate_orbital_elements, state_to_kepler,
};

const MU: f64 = 39.5;

fn assert_close(actual: Vector3, expected: Vector3, rel: f64, what: &str) {
    let scale = expected.norm().max(1e-12);
    let err = actual.distance_to(expected) / scale;
    assert!(err < rel, "{what}: {actual:?} vs {expected:?} (relative error {err:e})");
}

#[test]
fn elliptic_state_survives_round_trip() {
    let cases = [
        (Vector3::new(1.1, 0.2, 0.05), Vector3::new(-0.5, 6.0, 0.4)),
        (Vector3::new(-0.3, 1.4, -0.2), Vector3::new(-4.9, -0.8, 0.9)),
        (Vector3::new(0.7, -0.7, 0.3), Vector3::new(3.1, 4.2, -1.5)),
    ];
    for (r, v) in cases {
        let el = state_to_kepler(r, v, MU).expect("elements");
        assert!(el.a > 0.0 && el.e < 1.0, "{el:?}");
        let back = kepler_to_state(&el, MU).expect("state");
        assert_close(back.position, r, 1e-6, "position");
        assert_close(back.velocity, v, 1e-6, "velocity");
    }
}

#[test]
fn one_period_of_propagation_returns_to_start() {
    let r = Vector3::new(1.1, 0.2, 0.05);
    let v = Vector3::new(-0.5, 6.0, 0.4);
    let el = state_to_kepler(r, v, MU).expect("elements");
    let period = el.period(MU).expect("bound orbit has a period");

    let propagated = propagate_orbital_elements(&el, period, MU).expect("propagate");
    assert_eq!(propagated.a, el.a);
    assert_eq!(propagated.e, el.e);
    assert_eq!(propagated.i, el.i);
    assert_eq!(propagated.arg_p, el.arg_p);
    assert_eq!(propagated.l_an, el.l_an);

    let back = kepler_to_state(&propagated, MU).expect("state");
    assert_close(back.position, r, 1e-6, "position after one period");
    assert_close(back.velocity, v, 1e-6, "velocity after one period");
}

#[test]
fn half_period_of_circular_orbit_lands_opposite() {
    let r = Vector3::new(2.0, 0.0, 0.0);
    let v = Vector3::new(0.0, (MU / 2.0).sqrt(), 0.0);
    let el = state_to_kepler(r, v, MU).expect("elements");
    let half = 0.5 * el.period(MU).expect("period");

    let propagated = propagate_orbital_elements(&el, half, MU).expect("propagate");
    let state = kepler_to_state(&propagated, MU).expect("state");
    assert_close(state.position, Vector3::new(-2.0, 0.0, 0.0), 1e-6, "position");
    assert!((propagated.mean_anom - (el.mean_anom + PI).rem_euclid(2.0 * PI)).abs() < 1e-9);
}

#[test]
fn hyperbolic_state_survives_round_trip() {
    let r = Vector3::new(1.0, 0.1, 0.0);
    let v = Vector3::new(1.5, 12.0, 1.0);
    let el = state_to_kepler(r, v, MU).expect("elements");
    assert!(el.is_hyperbolic());
    assert!(el.a < 0.0 && el.e > 1.0, "{el:?}");
    assert!(el.true_anom.abs() < PI);

    let back = kepler_to_state(&el, MU).expect("state");
    assert_close(back.position, r, 1e-6, "position");
    assert_close(back.velocity, v, 1e-6, "velocity");
}

#[test]
fn hyperbolic_propagation_conserves_energy() {
    let r = Vector3::new(1.0, 0.1, 0.0);
    let v = Vector3::new(1.5, 12.0, 1.0);
    let el = state_to_kepler(r, v, MU).expect("elements");
    let energy = v.norm_squared() / 2.0 - MU / r.norm();

    let propagated = propagate_orbital_elements(&el, 0.3, MU).expect("propagate");
    assert_eq!(propagated.a, el.a);
    assert!(propagated.mean_anom > el.mean_anom);

    let state = kepler_to_state(&propagated, MU).expect("state");
    let later = state.velocity.norm_squared() / 2.0 - MU / state.position.norm();
    assert!((later - energy).abs() / energy.abs() < 1e-6, "{later} vs {energy}");
    assert!(state.position.norm() > r.norm());
}

#[test]
fn degenerate_inputs_are_reported() {
    let err = state_to_kepler(Vector3::ZERO, Vector3::Y, MU).unwrap_err();
    assert!(matches!(err, OrbitError::DegenerateGeometry(_)), "{err:?}");

    let err = state_to_kepler(Vector3::X, Vector3::Y, 0.0).unwrap_err();
    assert!(matches!(err, OrbitError::DegenerateGeometry(_)), "{err:?}");

    let escape = (2.0 * MU).sqrt();
    let err = state_to_kepler(Vector3::X, Vector3::new(0.0, escape, 0.0), MU).unwrap_err();
    assert!(matches!(err, OrbitError::Parabolic { .. }), "{err:?}");
}
