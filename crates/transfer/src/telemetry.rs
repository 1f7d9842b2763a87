//! Per-tick cockpit readout.

use orrery_orbits::{OrbitalElements, state_to_kepler};
use orrery_soi::SoiError;
use serde::Serialize;
use tracing::{debug, info};

use crate::PlanningError;
use crate::context::SimulationContext;

/// Displayed elements are rounded to this many decimals.
pub const ELEMENT_DECIMALS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoiTransition {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub epoch: f64,
    pub soi: String,
    pub soi_radius: f64,
    pub soi_depth: usize,
    /// Spacecraft elements about the current SOI body; `None` when the
    /// geometry has no elements (rectilinear, near-parabolic).
    pub elements: Option<OrbitalElements>,
    pub target_soi_radius: Option<f64>,
    pub speed: f64,
    pub relative_speed: f64,
    pub transition: Option<SoiTransition>,
    /// The spacecraft just fell back into the root SOI with a rendezvous on record.
    pub correction_due: bool,
}

impl SimulationContext {
    /// Classify the spacecraft and describe its orbit at the current epoch.
    pub fn observe(&mut self) -> Result<Telemetry, PlanningError> {
        self.refresh_soi_tree()?;
        let tree = self.soi_tree.as_ref().ok_or(SoiError::Empty)?;
        let spacecraft = self.masses.first().ok_or(PlanningError::NoSpacecraft)?;

        let current = tree.find_current_soi(&self.scenario, spacecraft.position, &self.masses)?;
        let relative = spacecraft.relative_to(&current.mass);
        let mu = self.g * current.mass.m;

        let elements = match state_to_kepler(relative.position, relative.velocity, mu) {
            Ok(elements) => Some(elements.rounded(ELEMENT_DECIMALS)),
            Err(err) => {
                debug!(soi = %current.mass.name, error = %err, "no elements for spacecraft");
                None
            }
        };

        let target_soi_radius = self
            .trajectory
            .as_ref()
            .and_then(|t| tree.node(&t.target))
            .map(|node| node.soi_radius);

        let transition = match &self.last_soi {
            Some(previous) if *previous != current.mass.name => Some(SoiTransition {
                from: previous.clone(),
                to: current.mass.name.clone(),
            }),
            _ => None,
        };
        let correction_due =
            transition.is_some() && current.depth == 0 && self.rendezvous.is_some();

        let telemetry = Telemetry {
            epoch: self.elapsed_time,
            soi: current.mass.name.clone(),
            soi_radius: current.soi_radius,
            soi_depth: current.depth,
            elements,
            target_soi_radius,
            speed: spacecraft.velocity.norm(),
            relative_speed: relative.velocity.norm(),
            transition,
            correction_due,
        };

        if let Some(transition) = &telemetry.transition {
            info!(from = %transition.from, to = %transition.to, correction_due, "spacecraft changed sphere of influence");
        }
        self.last_soi = Some(telemetry.soi.clone());
        Ok(telemetry)
    }
}
