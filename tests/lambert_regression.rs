use lambert_bate::get_velocities;
use orrery::core::constants::AU_KM;
use orrery::impulsive::lambert;

const G: f64 = 39.5;
const MU_SUN: f64 = 1.327_124_400_18e11; // km^3 / s^2

fn relative_error(a: [f64; 3], b: [f64; 3]) -> f64 {
    let diff = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
    let scale = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt();
    diff / scale
}

fn compare(r1: [f64; 3], r2: [f64; 3], tof: f64, mu: f64, short: bool) {
    let (v1, v2) = lambert::solve(r1, r2, tof, mu, short).expect("universal-variable solve");
    let (ref_v1, ref_v2) = get_velocities(r1, r2, tof, mu, short, 1e-8, 500)
        .unwrap_or_else(|e| panic!("reference solver failed: {e:?}"));

    assert!(
        relative_error(v1, ref_v1) < 1e-4,
        "v1 mismatch (short={short}): {v1:?} vs {ref_v1:?}"
    );
    assert!(
        relative_error(v2, ref_v2) < 1e-4,
        "v2 mismatch (short={short}): {v2:?} vs {ref_v2:?}"
    );
}

#[test]
fn agrees_with_reference_solver_in_scenario_units() {
    // (r1, r2, short-way tof, long-way tof)
    let cases = [
        ([1.0, 0.1, 0.0], [-0.8, 1.3, 0.2], 0.45, 1.0),
        ([0.9, -0.4, 0.05], [0.2, 1.5, -0.1], 0.4, 1.0),
        ([1.2, 0.0, 0.0], [0.5, 1.6, 0.3], 0.4, 1.1),
    ];
    for (r1, r2, short_tof, long_tof) in cases {
        compare(r1, r2, short_tof, G, true);
        compare(r1, r2, long_tof, G, false);
    }
}

#[test]
fn agrees_with_reference_solver_in_kilometres() {
    let r1 = [AU_KM, 0.0, 0.0];
    let r2 = [-0.5 * AU_KM, 1.3 * AU_KM, 0.02 * AU_KM];
    let tof = 200.0 * 86_400.0;
    compare(r1, r2, tof, MU_SUN, true);
}
