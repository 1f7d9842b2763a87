//! Explicit simulation state shared by the planner and the per-tick telemetry.

use std::collections::BTreeMap;

use orrery_config::{
    BodyMetadata, ConfigError, ScenarioConfig, SeedConfig, SolverConfig, tof_within_bounds,
};
use orrery_core::{Mass, Vector3};
use orrery_soi::{SoiError, SoiTree};
use serde::Serialize;
use tracing::debug;

use crate::PlanningError;

pub use orrery_config::IntegratorConfig as IntegratorParams;

/// Where the spacecraft should go and how long it may take.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySettings {
    pub target: String,
    /// Offset from the current epoch to the arrival epoch.
    pub arrival_offset: f64,
    pub min_tof: Option<f64>,
    pub max_tof: Option<f64>,
}

impl TrajectorySettings {
    /// Reject an arrival offset outside `[min_tof, max_tof]`.
    pub fn check_bounds(&self) -> Result<(), PlanningError> {
        if tof_within_bounds(self.arrival_offset, self.min_tof, self.max_tof) {
            Ok(())
        } else {
            Err(PlanningError::TimeOfFlightOutOfBounds {
                tof: self.arrival_offset,
                min: self.min_tof,
                max: self.max_tof,
            })
        }
    }
}

/// The planned arrival, expressed relative to `reference`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendezvous {
    /// Arrival point: the target's propagated position.
    pub position: Vector3,
    /// Spacecraft velocity on arrival.
    pub velocity: Vector3,
    /// Target state at the arrival epoch.
    pub target: Mass,
    pub reference: String,
    pub epoch: f64,
}

/// Play and trail flags, frozen while a plan is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackFlags {
    pub playing: bool,
    pub trails: bool,
}

/// Everything the engine knows about the running simulation.
///
/// The external integrator advances `masses` and `elapsed_time`; the engine
/// reads them and, when a plan is applied, writes them back.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub scenario: String,
    pub g: f64,
    pub integrator: IntegratorParams,
    pub elapsed_time: f64,
    /// Index 0 is the spacecraft.
    pub masses: Vec<Mass>,
    pub playing: bool,
    pub trails: bool,
    pub trajectory: Option<TrajectorySettings>,
    pub seed: Option<SeedConfig>,
    pub solver: SolverConfig,
    pub metadata: BTreeMap<String, BodyMetadata>,
    pub(crate) soi_tree: Option<SoiTree>,
    pub(crate) rendezvous: Option<Rendezvous>,
    pub(crate) last_soi: Option<String>,
}

impl SimulationContext {
    /// Bare context with default tunables and no trajectory target.
    pub fn new(scenario: impl Into<String>, g: f64, masses: Vec<Mass>) -> Self {
        Self {
            scenario: scenario.into(),
            g,
            integrator: IntegratorParams::default(),
            elapsed_time: 0.0,
            masses,
            playing: true,
            trails: true,
            trajectory: None,
            seed: None,
            solver: SolverConfig::default(),
            metadata: BTreeMap::new(),
            soi_tree: None,
            rendezvous: None,
            last_soi: None,
        }
    }

    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut context = Self::new(config.name.clone(), config.g, config.bodies()?);
        context.integrator = config.integrator.clone();
        context.elapsed_time = config.elapsed_time;
        context.trajectory = config.trajectory.as_ref().map(|t| TrajectorySettings {
            target: t.target.clone(),
            arrival_offset: t.arrival_offset,
            min_tof: t.min_tof,
            max_tof: t.max_tof,
        });
        context.seed = config.seed.clone();
        context.solver = config.solver;
        context.metadata = config.metadata();
        Ok(context)
    }

    pub fn spacecraft(&self) -> Option<&Mass> {
        self.masses.first()
    }

    pub fn rendezvous(&self) -> Option<&Rendezvous> {
        self.rendezvous.as_ref()
    }

    pub fn soi_tree(&self) -> Option<&SoiTree> {
        self.soi_tree.as_ref()
    }

    pub fn playback(&self) -> PlaybackFlags {
        PlaybackFlags {
            playing: self.playing,
            trails: self.trails,
        }
    }

    /// Stop playback and trails, returning the previous flags.
    pub(crate) fn freeze_playback(&mut self) -> PlaybackFlags {
        let flags = self.playback();
        self.playing = false;
        self.trails = false;
        flags
    }

    pub(crate) fn restore_playback(&mut self, flags: PlaybackFlags) {
        self.playing = flags.playing;
        self.trails = flags.trails;
    }

    /// Build the SOI tree if there is none or it belongs to another scenario.
    ///
    /// The spacecraft (index 0) is left out of the hierarchy.
    pub fn refresh_soi_tree(&mut self) -> Result<&SoiTree, SoiError> {
        let stale = self
            .soi_tree
            .as_ref()
            .map(|tree| tree.scenario() != self.scenario)
            .unwrap_or(true);

        if stale {
            let bodies = self.masses.get(1..).unwrap_or_default();
            debug!(scenario = %self.scenario, bodies = bodies.len(), "building soi tree");
            let tree = SoiTree::construct(self.scenario.clone(), bodies, self.g)?;
            self.last_soi = None;
            self.soi_tree = Some(tree);
        }

        self.soi_tree.as_ref().ok_or(SoiError::Empty)
    }
}
