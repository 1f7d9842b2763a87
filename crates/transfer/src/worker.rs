//! Off-thread trajectory solve.
//!
//! A request is a self-contained snapshot, moved onto a named thread; the
//! thread sends exactly one reply and exits.

use crossbeam_channel::{Receiver, bounded};
use orrery_config::{SeedConfig, SolverConfig};
use orrery_core::mass::find;
use orrery_core::{Mass, Vector3};
use orrery_impulsive::{Branch, LambertSettings, plan_flight};
use orrery_orbits::{
    KeplerSolver, kepler_to_state_with, propagate_orbital_elements_with, state_to_kepler,
};
use orrery_soi::SoiError;
use serde::Serialize;
use std::thread::JoinHandle;
use tracing::debug;

use crate::PlanningError;
use crate::context::IntegratorParams;

const THREAD_NAME: &str = "trajectory-cruncher";

/// Snapshot handed to the worker; every mass is relative to `primary`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryRequest {
    pub integrator: IntegratorParams,
    pub g: f64,
    pub elapsed_time: f64,
    /// Index 0 is the spacecraft.
    pub masses: Vec<Mass>,
    pub departure_epoch: f64,
    pub arrival_epoch: f64,
    pub target: String,
    pub primary: String,
    pub seed: Option<SeedConfig>,
    pub solver: SolverConfig,
}

/// Target state at the arrival epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalSnapshot {
    pub mass: Mass,
    pub epoch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryReply {
    pub init_vel: Vector3,
    pub final_vel: Vector3,
    pub arrival: ArrivalSnapshot,
    pub branch: Branch,
    pub iterations: usize,
}

/// Solve a request on the calling thread.
pub fn crunch(request: &TrajectoryRequest) -> Result<TrajectoryReply, PlanningError> {
    let primary = find(&request.masses, &request.primary)
        .ok_or_else(|| SoiError::StaleBody(request.primary.clone()))?;
    let spacecraft = request.masses.first().ok_or(PlanningError::NoSpacecraft)?;
    let target = find(&request.masses, &request.target)
        .ok_or_else(|| PlanningError::UnknownTarget(request.target.clone()))?;

    let mu = request.g * primary.m;
    let time_of_flight = request.arrival_epoch - request.departure_epoch;
    let kepler = KeplerSolver {
        tolerance: request.solver.kepler_tolerance,
        max_iterations: request.solver.kepler_max_iterations,
    };

    let elements = state_to_kepler(target.position, target.velocity, mu)?;
    let propagated = propagate_orbital_elements_with(&elements, time_of_flight, mu, &kepler)?;
    let arrival_state = kepler_to_state_with(&propagated, mu, &kepler)?;

    let mut arrival_mass = target.clone();
    arrival_mass.set_state(arrival_state);

    let normal = spacecraft
        .position
        .cross(spacecraft.velocity)
        .normalized()
        .unwrap_or(Vector3::Z);
    let branch = Branch::prograde(spacecraft.position, arrival_mass.position, normal);
    let settings = LambertSettings {
        tolerance: request.solver.lambert_tolerance,
        max_iterations: request.solver.lambert_max_iterations,
    };
    debug!(target = %request.target, time_of_flight, mu, ?branch, "solving transfer arc");
    let solution = plan_flight(time_of_flight, spacecraft, &arrival_mass, mu, branch, &settings)?;

    Ok(TrajectoryReply {
        init_vel: solution.init_vel,
        final_vel: solution.final_vel,
        arrival: ArrivalSnapshot {
            mass: arrival_mass,
            epoch: request.arrival_epoch,
        },
        branch: solution.branch,
        iterations: solution.iterations,
    })
}

/// Spawns the worker thread for one request.
pub struct TrajectoryCruncher;

impl TrajectoryCruncher {
    pub fn spawn(request: TrajectoryRequest) -> Result<PendingTrajectory, PlanningError> {
        let (sender, receiver) = bounded(1);
        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let reply = crunch(&request);
                if sender.send(reply).is_err() {
                    debug!("trajectory reply dropped; requester went away");
                }
            })
            .map_err(PlanningError::WorkerSpawn)?;

        Ok(PendingTrajectory { receiver, handle })
    }
}

/// A solve in flight.
pub struct PendingTrajectory {
    receiver: Receiver<Result<TrajectoryReply, PlanningError>>,
    handle: JoinHandle<()>,
}

impl PendingTrajectory {
    /// Block for the single reply, then tear the worker down.
    pub fn wait(self) -> Result<TrajectoryReply, PlanningError> {
        let reply = self.receiver.recv();
        if self.handle.join().is_err() {
            debug!("trajectory worker panicked");
        }
        reply.unwrap_or(Err(PlanningError::WorkerLost))
    }
}
