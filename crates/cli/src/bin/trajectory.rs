use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use orrery::config::load_scenario;
use orrery::core::mass::find;
use orrery::core::units::au_yr_to_km_s;
use orrery::export::trajectory::{TrajectoryReport, write_report};
use orrery::export::writer_for_path;
use orrery::impulsive::{bi_elliptic, hohmann};
use orrery::transfer::{
    SimulationContext, TrajectoryOptions, TrajectoryOutcome, TrajectoryPlanner,
    TrajectorySettings,
};
use orrery_cli::init_logging;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Plan a Lambert transfer from the spacecraft to a target body"
)]
struct Cli {
    /// Scenario manifest (YAML list, TOML file, or directory of TOML files)
    #[arg(long)]
    scenario: PathBuf,

    /// Scenario name within the manifest (defaults to the first)
    #[arg(long)]
    name: Option<String>,

    /// Target body (defaults to the manifest's trajectory target)
    #[arg(long)]
    target: Option<String>,

    /// Time of flight in years (defaults to the manifest's arrival offset)
    #[arg(long)]
    arrival: Option<f64>,

    /// After applying the plan, re-plan against the recorded rendezvous epoch
    #[arg(long, default_value_t = false)]
    correction: bool,

    /// Report the plan without applying it
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Print coplanar circular Hohmann estimate (Δv, TOF)
    #[arg(long, default_value_t = false)]
    estimate_hohmann: bool,

    /// Print a bi-elliptic estimate through the given intermediate apoapsis (AU)
    #[arg(long, value_name = "RB")]
    estimate_bi_elliptic: Option<f64>,

    /// Write a JSON report (`-` for stdout)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_scenario(&cli.scenario, cli.name.as_deref())?;
    let mut ctx = SimulationContext::from_config(&config)?;
    ctx.trajectory = merge_settings(ctx.trajectory.take(), &cli)?;

    let mut planner = TrajectoryPlanner::new();
    let options = TrajectoryOptions {
        correction: false,
        apply: !cli.dry_run,
    };
    let mut outcome = planner.plan(&mut ctx, options)?;
    print_outcome("Transfer", &outcome);

    if cli.correction {
        outcome = planner.plan(
            &mut ctx,
            TrajectoryOptions {
                correction: true,
                apply: !cli.dry_run,
            },
        )?;
        print_outcome("Correction", &outcome);
    }

    if cli.estimate_hohmann || cli.estimate_bi_elliptic.is_some() {
        let plan = outcome.plan();
        let reference = find(&ctx.masses, &plan.reference)
            .ok_or_else(|| anyhow::anyhow!("reference body '{}' vanished", plan.reference))?;
        let spacecraft = ctx
            .spacecraft()
            .ok_or_else(|| anyhow::anyhow!("scenario has no spacecraft"))?;
        let r1 = spacecraft.position.distance_to(reference.position);
        let r2 = plan.rendezvous.position.norm();
        let mu = ctx.g * reference.m;

        if cli.estimate_hohmann {
            let h = hohmann(r1, r2, mu)?;
            println!(
                "Hohmann est.   : Δv_total = {:.3} km/s (dv1={:.3}, dv2={:.3}), TOF = {:.2} days",
                au_yr_to_km_s(h.dv_total),
                au_yr_to_km_s(h.dv1),
                au_yr_to_km_s(h.dv2),
                h.tof * 365.25
            );
        }
        if let Some(rb) = cli.estimate_bi_elliptic {
            let b = bi_elliptic(r1, r2, rb, mu)?;
            println!(
                "Bi-elliptic est: Δv_total = {:.3} km/s (dv1={:.3}, dv2={:.3}, dv3={:.3}), TOF = {:.2} days, rb = {} AU",
                au_yr_to_km_s(b.dv_total),
                au_yr_to_km_s(b.dv1),
                au_yr_to_km_s(b.dv2),
                au_yr_to_km_s(b.dv3),
                b.tof * 365.25,
                b.rb
            );
        }
    }

    if let Some(path) = &cli.export {
        let mut writer = writer_for_path(path)?;
        write_report(writer.as_mut(), &TrajectoryReport::new(&ctx.scenario, &outcome))?;
        writer.flush()?;
    }

    Ok(())
}

fn merge_settings(
    settings: Option<TrajectorySettings>,
    cli: &Cli,
) -> anyhow::Result<Option<TrajectorySettings>> {
    let merged = match (settings, &cli.target, cli.arrival) {
        (Some(mut s), target, arrival) => {
            if let Some(target) = target {
                s.target = target.clone();
            }
            if let Some(arrival) = arrival {
                s.arrival_offset = arrival;
            }
            Some(s)
        }
        (None, Some(target), Some(arrival)) => Some(TrajectorySettings {
            target: target.clone(),
            arrival_offset: arrival,
            min_tof: None,
            max_tof: None,
        }),
        (None, None, None) => None,
        (None, _, _) => anyhow::bail!("--target and --arrival are both required without a manifest trajectory"),
    };
    if let Some(settings) = &merged {
        settings.check_bounds()?;
    }
    Ok(merged)
}

fn print_outcome(label: &str, outcome: &TrajectoryOutcome) {
    let plan = outcome.plan();
    println!("=== {label}: {:?} ===", outcome.state());
    println!("Frame          : relative to {}", plan.reference);
    println!(
        "Epochs         : depart {:.4} yr, arrive {:.4} yr (TOF = {:.2} days)",
        plan.departure_epoch,
        plan.arrival_epoch,
        (plan.arrival_epoch - plan.departure_epoch) * 365.25
    );
    println!(
        "Departure burn : Δv = {:.3} km/s ({:?})",
        au_yr_to_km_s(plan.departure_delta_v),
        plan.branch
    );
    println!(
        "Arrival burn   : Δv = {:.3} km/s to match {}",
        au_yr_to_km_s(plan.arrival_delta_v),
        plan.target
    );
}
