use std::f64::consts::PI;

use orrery::core::{Mass, Vector3};
use orrery::soi::{SoiError, SoiTree, radius_soi};

mod common;
use common::{G, circular};

fn sun_earth_moon() -> Vec<Mass> {
    let sun = Mass::new("Sun", 1.0, Vector3::ZERO, Vector3::ZERO);
    let earth = circular("Earth", 3.003e-6, &sun, 1.0, 0.0);
    let moon = circular("Moon", 3.694e-8, &earth, 0.00257, 0.0);
    vec![sun, earth, moon]
}

#[test]
fn moon_nests_under_earth_under_sun() {
    let masses = sun_earth_moon();
    let tree = SoiTree::construct("Earth-Moon", &masses, G).expect("tree");

    assert_eq!(tree.root().name, "Sun");
    assert!(tree.root().soi_radius.is_infinite());
    assert_eq!(tree.primary_of("Earth").expect("earth parent").name, "Sun");
    assert_eq!(tree.primary_of("Moon").expect("moon parent").name, "Earth");
    assert!(matches!(tree.primary_of("Sun"), Err(SoiError::UnknownBody(_))));

    let earth = tree.node("Earth").expect("earth node");
    let moon = tree.node("Moon").expect("moon node");
    assert!(moon.soi_radius < earth.soi_radius);
    // child sphere stays inside the parent sphere
    assert!(moon.position.distance_to(earth.position) + moon.soi_radius < earth.soi_radius);

    let expected = radius_soi(&masses[0], &masses[1], G).expect("earth radius");
    assert!((earth.soi_radius - expected).abs() < 1e-15);

    let depths: Vec<(usize, &str)> = tree
        .nodes()
        .into_iter()
        .map(|(depth, node)| (depth, node.name.as_str()))
        .collect();
    assert_eq!(depths, vec![(0, "Sun"), (1, "Earth"), (2, "Moon")]);
}

#[test]
fn lookup_returns_innermost_sphere() {
    let masses = sun_earth_moon();
    let tree = SoiTree::construct("Earth-Moon", &masses, G).expect("tree");
    let earth = masses[1].position;
    let moon = masses[2].position;

    let at_moon = tree.find_current_soi("Earth-Moon", moon, &masses).expect("lookup");
    assert_eq!(at_moon.mass.name, "Moon");
    assert_eq!(at_moon.depth, 2);

    let near_earth = earth.plus(Vector3::new(0.0, 0.004, 0.0));
    let in_earth = tree.find_current_soi("Earth-Moon", near_earth, &masses).expect("lookup");
    assert_eq!(in_earth.mass.name, "Earth");
    assert_eq!(in_earth.mass, masses[1]);

    let beyond_earth = earth.plus(Vector3::new(0.02, 0.0, 0.0));
    let in_sun = tree.find_current_soi("Earth-Moon", beyond_earth, &masses).expect("lookup");
    assert_eq!(in_sun.mass.name, "Sun");
    assert_eq!(in_sun.depth, 0);
}

#[test]
fn lookup_follows_current_positions() {
    let mut masses = sun_earth_moon();
    let tree = SoiTree::construct("Earth-Moon", &masses, G).expect("tree");

    let shift = Vector3::new(-1.0, 1.0, 0.0);
    for body in masses.iter_mut().skip(1) {
        body.position = body.position.plus(shift);
    }

    let probe = masses[1].position.plus(Vector3::new(0.003, 0.0, 0.003));
    let current = tree.find_current_soi("Earth-Moon", probe, &masses).expect("lookup");
    assert_eq!(current.mass.name, "Earth");
    assert_eq!(current.mass.position, masses[1].position);
}

#[test]
fn lookup_rejects_a_tree_from_another_scenario() {
    let masses = sun_earth_moon();
    let tree = SoiTree::construct("Earth-Moon", &masses, G).expect("tree");
    let err = tree
        .find_current_soi("Jovian", Vector3::ZERO, &masses)
        .unwrap_err();
    assert_eq!(
        err,
        SoiError::StaleReference {
            expected: "Earth-Moon".into(),
            found: "Jovian".into()
        }
    );

    let without_moon = &masses[..2];
    let moon = masses[2].position;
    let err = tree.find_current_soi("Earth-Moon", moon, without_moon).unwrap_err();
    assert_eq!(err, SoiError::StaleBody("Moon".into()));
}

#[test]
fn overlapping_siblings_resolve_to_the_smaller_sphere() {
    let sun = Mass::new("Sun", 1.0, Vector3::ZERO, Vector3::ZERO);
    let big = circular("Big", 1e-3, &sun, 1.0, 0.0);
    // (1e-5)^(2/5) = 0.01 AU at a = 1
    let small = circular("Small", 1e-5, &sun, 1.0, PI);
    let mut masses = vec![sun, big, small];
    let tree = SoiTree::construct("Siblings", &masses, G).expect("tree");

    assert_eq!(tree.primary_of("Big").expect("big parent").name, "Sun");
    assert_eq!(tree.primary_of("Small").expect("small parent").name, "Sun");
    let big_radius = tree.node("Big").expect("big").soi_radius;
    let small_radius = tree.node("Small").expect("small").soi_radius;
    assert!((small_radius - 0.01).abs() < 1e-6, "{small_radius}");
    assert!(big_radius > 0.06, "{big_radius}");

    // drift Small into Big's sphere
    masses[2].position = Vector3::new(1.0, 0.02, 0.0);

    let both = Vector3::new(1.0, 0.012, 0.0);
    let current = tree.find_current_soi("Siblings", both, &masses).expect("lookup");
    assert_eq!(current.mass.name, "Small");
    assert_eq!(current.depth, 1);
    assert_eq!(current.soi_radius, small_radius);

    let big_only = Vector3::new(1.0, -0.01, 0.0);
    let current = tree.find_current_soi("Siblings", big_only, &masses).expect("lookup");
    assert_eq!(current.mass.name, "Big");
}
