//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod elements {
    use std::io::{self, Write};

    use orrery_orbits::OrbitalElements;

    const HEADER: &str = "epoch,body,primary,a,e,i,arg_p,l_an,true_anom,ecc_anom,mean_anom";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One row of orbital elements, already rounded for display.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub epoch: f64,
        pub body: &'a str,
        pub primary: &'a str,
        pub elements: OrbitalElements,
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            let el = &self.elements;
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{},{},{},{}",
                self.epoch,
                self.body,
                self.primary,
                el.a,
                el.e,
                el.i,
                el.arg_p,
                el.l_an,
                el.true_anom,
                el.ecc_anom,
                el.mean_anom,
            )
        }
    }
}

pub mod trajectory {
    use std::io::{self, Write};

    use orrery_core::Vector3;
    use orrery_core::units::au_yr_to_km_s;
    use orrery_transfer::{PlanState, TrajectoryOutcome};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// Flattened report of a finished plan.
    #[derive(Debug, Clone, Serialize)]
    pub struct TrajectoryReport<'a> {
        pub scenario: &'a str,
        pub state: PlanState,
        pub reference: &'a str,
        pub target: &'a str,
        pub departure_epoch: f64,
        pub arrival_epoch: f64,
        pub time_of_flight: f64,
        pub departure_velocity: Vector3,
        pub arrival_velocity: Vector3,
        pub departure_delta_v: f64,
        pub arrival_delta_v: f64,
        pub departure_delta_v_km_s: f64,
        pub arrival_delta_v_km_s: f64,
        pub rendezvous_position: Vector3,
    }

    impl<'a> TrajectoryReport<'a> {
        pub fn new(scenario: &'a str, outcome: &'a TrajectoryOutcome) -> Self {
            let plan = outcome.plan();
            Self {
                scenario,
                state: outcome.state(),
                reference: &plan.reference,
                target: &plan.target,
                departure_epoch: plan.departure_epoch,
                arrival_epoch: plan.arrival_epoch,
                time_of_flight: plan.arrival_epoch - plan.departure_epoch,
                departure_velocity: plan.departure_velocity,
                arrival_velocity: plan.arrival_velocity,
                departure_delta_v: plan.departure_delta_v,
                arrival_delta_v: plan.arrival_delta_v,
                departure_delta_v_km_s: au_yr_to_km_s(plan.departure_delta_v),
                arrival_delta_v_km_s: au_yr_to_km_s(plan.arrival_delta_v),
                rendezvous_position: plan.rendezvous.position,
            }
        }
    }

    pub fn write_report(writer: &mut dyn Write, report: &TrajectoryReport<'_>) -> io::Result<()> {
        to_writer_pretty(&mut *writer, report).map_err(io::Error::other)?;
        writeln!(writer)
    }
}
