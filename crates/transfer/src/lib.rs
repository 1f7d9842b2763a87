//! Trajectory orchestration: simulation context, off-thread Lambert solves, and
//! per-tick sphere-of-influence telemetry.

pub mod context;
pub mod planner;
pub mod telemetry;
pub mod worker;

pub use context::{IntegratorParams, PlaybackFlags, Rendezvous, SimulationContext, TrajectorySettings};
pub use planner::{PlanState, TrajectoryOptions, TrajectoryOutcome, TrajectoryPlan, TrajectoryPlanner};
pub use telemetry::{SoiTransition, Telemetry};
pub use worker::{ArrivalSnapshot, PendingTrajectory, TrajectoryCruncher, TrajectoryReply, TrajectoryRequest};

use orrery_core::VectorError;
use orrery_impulsive::LambertSolverError;
use orrery_orbits::OrbitError;
use orrery_soi::SoiError;
use thiserror::Error;

/// Why a trajectory request was discarded.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("orbit conversion failed: {0}")]
    Orbit(#[from] OrbitError),
    #[error("sphere-of-influence lookup failed: {0}")]
    Soi(#[from] SoiError),
    #[error("lambert solve failed: {0}")]
    Lambert(#[from] LambertSolverError),
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error("scenario has no spacecraft")]
    NoSpacecraft,
    #[error("scenario has no trajectory target")]
    NoTarget,
    #[error("trajectory target '{0}' is not in the scenario")]
    UnknownTarget(String),
    #[error("'{0}' cannot be a trajectory target")]
    InvalidTarget(String),
    #[error("time of flight {tof} lies outside the window [{min:?}, {max:?}]")]
    TimeOfFlightOutOfBounds {
        tof: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    #[error("correction requested but no rendezvous is recorded")]
    NoRendezvous,
    #[error("trajectory worker exited without replying")]
    WorkerLost,
    #[error("failed to spawn trajectory worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
