//! Scenario manifests for the Orrery workspace.
//!
//! A manifest describes one simulation: its gravitational constant, integrator
//! tunables passed through to the external integrator, the bodies, and the
//! trajectory-planning settings. Bodies are written either as a full state or
//! as seed elements about an earlier body.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use orrery_core::constants::G_AU3_MSUN_YR2;
use orrery_core::mass::find;
use orrery_core::{Mass, Vector3};
use orrery_orbits::{SeedElements, orbit_from_elements};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

fn default_g() -> f64 {
    G_AU3_MSUN_YR2
}

fn default_integrator() -> String {
    "RK4".to_string()
}

/// Integrator tunables. The engine never integrates; these are carried
/// through to the worker unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    #[serde(default = "default_integrator")]
    pub integrator: String,
    pub dt: f64,
    pub tol: f64,
    pub min_dt: f64,
    pub max_dt: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            integrator: default_integrator(),
            dt: 5e-5,
            tol: 1e-12,
            min_dt: 1e-10,
            max_dt: 1e-3,
        }
    }
}

/// Display and role extras kept beside, never inside, a [`Mass`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyMetadata {
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub spacecraft: bool,
}

/// One body in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyConfig {
    State {
        name: String,
        m: f64,
        position: Vector3,
        #[serde(default)]
        velocity: Vector3,
        #[serde(default)]
        metadata: BodyMetadata,
    },
    /// Placed at apoapsis of the given orbit about `primary`.
    Elements {
        name: String,
        m: f64,
        primary: String,
        elements: SeedElements,
        #[serde(default)]
        metadata: BodyMetadata,
    },
}

impl BodyConfig {
    pub fn name(&self) -> &str {
        match self {
            BodyConfig::State { name, .. } | BodyConfig::Elements { name, .. } => name,
        }
    }

    pub fn metadata(&self) -> &BodyMetadata {
        match self {
            BodyConfig::State { metadata, .. } | BodyConfig::Elements { metadata, .. } => metadata,
        }
    }
}

/// Where and when the spacecraft should arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    pub target: String,
    /// Time of flight from the current epoch, in years.
    pub arrival_offset: f64,
    #[serde(default)]
    pub min_tof: Option<f64>,
    #[serde(default)]
    pub max_tof: Option<f64>,
}

/// Whether `time_of_flight` lies inside the optional `[min_tof, max_tof]` window.
pub fn tof_within_bounds(time_of_flight: f64, min_tof: Option<f64>, max_tof: Option<f64>) -> bool {
    min_tof.is_none_or(|min| time_of_flight >= min) && max_tof.is_none_or(|max| time_of_flight <= max)
}

/// Root-finder tunables for the Kepler and Lambert solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub kepler_tolerance: f64,
    pub kepler_max_iterations: usize,
    pub lambert_tolerance: f64,
    pub lambert_max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kepler_tolerance: 1e-8,
            kepler_max_iterations: 100,
            lambert_tolerance: 1e-10,
            lambert_max_iterations: 500,
        }
    }
}

/// Seed elements for bodies added at runtime, with the body they orbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub primary: String,
    #[serde(flatten)]
    pub elements: SeedElements,
}

/// A complete scenario manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_g")]
    pub g: f64,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default)]
    pub trajectory: Option<TrajectoryConfig>,
    #[serde(default)]
    pub seed: Option<SeedConfig>,
    #[serde(default)]
    pub solver: SolverConfig,
    /// Index 0 is the spacecraft.
    pub masses: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.g > 0.0) {
            return invalid(format!("{}: g must be positive, got {}", self.name, self.g));
        }
        if self.masses.is_empty() {
            return invalid(format!("{}: no masses", self.name));
        }
        let integrator = &self.integrator;
        if !(integrator.dt > 0.0) || !(integrator.min_dt > 0.0) || integrator.min_dt > integrator.max_dt {
            return invalid(format!("{}: integrator step bounds are inconsistent", self.name));
        }

        let mut seen = BTreeSet::new();
        for body in &self.masses {
            if !seen.insert(body.name()) {
                return invalid(format!("{}: duplicate body '{}'", self.name, body.name()));
            }
            if let BodyConfig::Elements { name, primary, .. } = body {
                if !seen.contains(primary.as_str()) || primary == name {
                    return invalid(format!(
                        "{}: body '{name}' orbits '{primary}', which must be listed before it",
                        self.name
                    ));
                }
            }
        }

        if let Some(trajectory) = &self.trajectory {
            if !seen.contains(trajectory.target.as_str()) {
                return invalid(format!("{}: unknown trajectory target '{}'", self.name, trajectory.target));
            }
            if !(trajectory.arrival_offset > 0.0) {
                return invalid(format!("{}: arrival offset must be positive", self.name));
            }
            if let (Some(min), Some(max)) = (trajectory.min_tof, trajectory.max_tof) {
                if min > max {
                    return invalid(format!("{}: min_tof exceeds max_tof", self.name));
                }
            }
            if !tof_within_bounds(trajectory.arrival_offset, trajectory.min_tof, trajectory.max_tof) {
                return invalid(format!(
                    "{}: arrival offset {} lies outside the time-of-flight bounds",
                    self.name, trajectory.arrival_offset
                ));
            }
        }
        if let Some(seed) = &self.seed {
            if !seen.contains(seed.primary.as_str()) {
                return invalid(format!("{}: unknown seed primary '{}'", self.name, seed.primary));
            }
        }
        Ok(())
    }

    /// Resolve every body to an absolute state, in manifest order.
    pub fn bodies(&self) -> Result<Vec<Mass>, ConfigError> {
        let mut masses: Vec<Mass> = Vec::with_capacity(self.masses.len());
        for body in &self.masses {
            let mass = match body {
                BodyConfig::State {
                    name,
                    m,
                    position,
                    velocity,
                    ..
                } => Mass::new(name.clone(), *m, *position, *velocity),
                BodyConfig::Elements {
                    name,
                    m,
                    primary,
                    elements,
                    ..
                } => {
                    let parent = find(&masses, primary).ok_or_else(|| {
                        ConfigError::Invalid(format!("body '{name}' orbits unknown '{primary}'"))
                    })?;
                    let state = orbit_from_elements(parent, elements, self.g * parent.m)
                        .map_err(|e| ConfigError::Invalid(format!("cannot seed '{name}': {e}")))?;
                    Mass::new(name.clone(), *m, state.position, state.velocity)
                }
            };
            masses.push(mass);
        }
        Ok(masses)
    }

    pub fn metadata(&self) -> BTreeMap<String, BodyMetadata> {
        self.masses
            .iter()
            .map(|body| (body.name().to_string(), body.metadata().clone()))
            .collect()
    }
}

/// Load every scenario at `path`: a YAML list, a single TOML manifest, or a
/// directory of TOML manifests (sorted by file name).
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<ScenarioConfig>, ConfigError> {
    let scenarios: Vec<ScenarioConfig> = load_records(path)?;
    for scenario in &scenarios {
        scenario.validate()?;
    }
    Ok(scenarios)
}

/// Load the scenario called `name`, or the first one when `name` is `None`.
pub fn load_scenario<P: AsRef<Path>>(path: P, name: Option<&str>) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    let scenarios = load_scenarios(path)?;
    let found = match name {
        Some(name) => scenarios.into_iter().find(|s| s.name == name),
        None => scenarios.into_iter().next(),
    };
    found.ok_or_else(|| {
        ConfigError::Invalid(format!(
            "no scenario {} in {}",
            name.map(|n| format!("named '{n}'")).unwrap_or_else(|| "at all".to_string()),
            path.display()
        ))
    })
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();

    let mut records = Vec::with_capacity(entries.len());
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        records.push(toml::from_str(&contents)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun_and_earth() -> ScenarioConfig {
        ScenarioConfig {
            name: "Inner".into(),
            description: None,
            g: G_AU3_MSUN_YR2,
            integrator: IntegratorConfig::default(),
            elapsed_time: 0.0,
            trajectory: None,
            seed: None,
            solver: SolverConfig::default(),
            masses: vec![
                BodyConfig::State {
                    name: "Sun".into(),
                    m: 1.0,
                    position: Vector3::ZERO,
                    velocity: Vector3::ZERO,
                    metadata: BodyMetadata::default(),
                },
                BodyConfig::Elements {
                    name: "Earth".into(),
                    m: 3.003e-6,
                    primary: "Sun".into(),
                    elements: SeedElements {
                        a: 1.0,
                        ..SeedElements::default()
                    },
                    metadata: BodyMetadata::default(),
                },
            ],
        }
    }

    #[test]
    fn elements_bodies_resolve_about_their_primary() {
        let scenario = sun_and_earth();
        scenario.validate().unwrap();
        let masses = scenario.bodies().unwrap();
        assert_eq!(masses.len(), 2);
        assert!((masses[1].position.norm() - 1.0).abs() < 1e-9);
        assert!((masses[1].velocity.norm() - G_AU3_MSUN_YR2.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn primaries_must_precede_their_satellites() {
        let mut scenario = sun_and_earth();
        scenario.masses.reverse();
        assert!(matches!(scenario.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn trajectory_target_must_exist() {
        let mut scenario = sun_and_earth();
        scenario.trajectory = Some(TrajectoryConfig {
            target: "Mars".into(),
            arrival_offset: 0.7,
            min_tof: None,
            max_tof: None,
        });
        assert!(matches!(scenario.validate(), Err(ConfigError::Invalid(_))));
    }
}
