//! Request, compute, then apply or discard a transfer to the configured target.

use orrery_core::mass::find;
use orrery_core::{Mass, Vector3};
use orrery_impulsive::Branch;
use orrery_soi::SoiError;
use serde::Serialize;
use tracing::{info, warn};

use crate::PlanningError;
use crate::context::{PlaybackFlags, Rendezvous, SimulationContext};
use crate::worker::{TrajectoryCruncher, TrajectoryReply, TrajectoryRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanState {
    Idle,
    Requested,
    Computing,
    Applied,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryOptions {
    /// Re-aim at the recorded rendezvous epoch instead of a fresh arrival.
    pub correction: bool,
    /// Write the departure burn into the context.
    pub apply: bool,
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        Self {
            correction: false,
            apply: true,
        }
    }
}

/// What a finished solve produced, relative to `reference`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryPlan {
    pub reference: String,
    pub target: String,
    pub departure_epoch: f64,
    pub arrival_epoch: f64,
    pub departure_velocity: Vector3,
    pub arrival_velocity: Vector3,
    /// Burn magnitude to leave the current orbit.
    pub departure_delta_v: f64,
    /// Burn magnitude to match the target on arrival.
    pub arrival_delta_v: f64,
    pub branch: Branch,
    pub iterations: usize,
    pub rendezvous: Rendezvous,
    /// Flags in force before the request; restored on return.
    pub playback: PlaybackFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrajectoryOutcome {
    Applied(TrajectoryPlan),
    Discarded(TrajectoryPlan),
}

impl TrajectoryOutcome {
    pub fn state(&self) -> PlanState {
        match self {
            TrajectoryOutcome::Applied(_) => PlanState::Applied,
            TrajectoryOutcome::Discarded(_) => PlanState::Discarded,
        }
    }

    pub fn plan(&self) -> &TrajectoryPlan {
        match self {
            TrajectoryOutcome::Applied(plan) | TrajectoryOutcome::Discarded(plan) => plan,
        }
    }
}

/// Computed but not yet committed.
struct Solved {
    snapshot: Vec<Mass>,
    reference: String,
    target: String,
    departure_epoch: f64,
    reply: TrajectoryReply,
}

/// Drives one context through `Idle → Requested → Computing → Applied | Discarded`.
#[derive(Debug)]
pub struct TrajectoryPlanner {
    state: PlanState,
}

impl Default for TrajectoryPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryPlanner {
    pub fn new() -> Self {
        Self {
            state: PlanState::Idle,
        }
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    fn transition(&mut self, next: PlanState) {
        info!(from = ?self.state, to = ?next, "trajectory plan state");
        self.state = next;
    }

    /// Plan a transfer from the spacecraft to the configured target.
    ///
    /// The live masses change only when `options.apply` is set and the solve
    /// succeeds. Play and trail flags are frozen for the duration and restored
    /// on every path.
    pub fn plan(
        &mut self,
        ctx: &mut SimulationContext,
        options: TrajectoryOptions,
    ) -> Result<TrajectoryOutcome, PlanningError> {
        self.transition(PlanState::Requested);
        let playback = ctx.freeze_playback();

        let solved = self.compute(ctx, options);
        ctx.restore_playback(playback);

        let solved = match solved {
            Ok(solved) => solved,
            Err(err) => {
                warn!(error = %err, "trajectory discarded");
                self.transition(PlanState::Discarded);
                return Err(err);
            }
        };

        let plan = summarize(&solved, playback)?;
        ctx.rendezvous = Some(plan.rendezvous.clone());

        if options.apply {
            let mut masses = solved.snapshot;
            if let Some(spacecraft) = masses.first_mut() {
                spacecraft.velocity = solved.reply.init_vel;
            }
            ctx.masses = masses;
            self.transition(PlanState::Applied);
            Ok(TrajectoryOutcome::Applied(plan))
        } else {
            self.transition(PlanState::Discarded);
            Ok(TrajectoryOutcome::Discarded(plan))
        }
    }

    fn compute(
        &mut self,
        ctx: &mut SimulationContext,
        options: TrajectoryOptions,
    ) -> Result<Solved, PlanningError> {
        let settings = ctx.trajectory.clone().ok_or(PlanningError::NoTarget)?;
        let spacecraft = ctx.spacecraft().ok_or(PlanningError::NoSpacecraft)?;
        if spacecraft.name == settings.target {
            return Err(PlanningError::InvalidTarget(settings.target));
        }
        if find(&ctx.masses, &settings.target).is_none() {
            return Err(PlanningError::UnknownTarget(settings.target));
        }

        let tree = ctx.refresh_soi_tree()?;
        if tree.root().name == settings.target {
            return Err(PlanningError::InvalidTarget(settings.target));
        }
        let reference_name = tree.primary_of(&settings.target)?.name.clone();
        let reference = find(&ctx.masses, &reference_name)
            .ok_or_else(|| SoiError::StaleBody(reference_name.clone()))?;

        let snapshot: Vec<Mass> = ctx.masses.iter().map(|m| m.relative_to(reference)).collect();

        let departure_epoch = ctx.elapsed_time;
        let arrival_epoch = if options.correction {
            ctx.rendezvous
                .as_ref()
                .ok_or(PlanningError::NoRendezvous)?
                .epoch
        } else {
            settings.check_bounds()?;
            departure_epoch + settings.arrival_offset
        };

        info!(
            target = %settings.target,
            reference = %reference_name,
            departure_epoch,
            arrival_epoch,
            correction = options.correction,
            "dispatching trajectory request"
        );

        let request = TrajectoryRequest {
            integrator: ctx.integrator.clone(),
            g: ctx.g,
            elapsed_time: ctx.elapsed_time,
            masses: snapshot.clone(),
            departure_epoch,
            arrival_epoch,
            target: settings.target.clone(),
            primary: reference_name.clone(),
            seed: ctx.seed.clone(),
            solver: ctx.solver,
        };

        self.transition(PlanState::Computing);
        let reply = TrajectoryCruncher::spawn(request)?.wait()?;

        Ok(Solved {
            snapshot,
            reference: reference_name,
            target: settings.target,
            departure_epoch,
            reply,
        })
    }
}

fn summarize(solved: &Solved, playback: PlaybackFlags) -> Result<TrajectoryPlan, PlanningError> {
    let reply = &solved.reply;
    let spacecraft = solved.snapshot.first().ok_or(PlanningError::NoSpacecraft)?;
    let arrival = &reply.arrival;

    Ok(TrajectoryPlan {
        reference: solved.reference.clone(),
        target: solved.target.clone(),
        departure_epoch: solved.departure_epoch,
        arrival_epoch: arrival.epoch,
        departure_velocity: reply.init_vel,
        arrival_velocity: reply.final_vel,
        departure_delta_v: reply.init_vel.distance_to(spacecraft.velocity),
        arrival_delta_v: reply.final_vel.distance_to(arrival.mass.velocity),
        branch: reply.branch,
        iterations: reply.iterations,
        rendezvous: Rendezvous {
            position: arrival.mass.position,
            velocity: reply.final_vel,
            target: arrival.mass.clone(),
            reference: solved.reference.clone(),
            epoch: arrival.epoch,
        },
        playback,
    })
}
