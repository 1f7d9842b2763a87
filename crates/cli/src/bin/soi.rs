use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use orrery::config::load_scenario;
use orrery::core::mass::find;
use orrery::export::elements::{Record, write_header};
use orrery::export::writer_for_path;
use orrery::orbits::state_to_kepler;
use orrery::transfer::SimulationContext;
use orrery::transfer::telemetry::ELEMENT_DECIMALS;
use orrery_cli::init_logging;
use tracing::warn;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Sphere-of-influence hierarchy and spacecraft telemetry for a scenario"
)]
struct Cli {
    /// Scenario manifest (YAML list, TOML file, or directory of TOML files)
    #[arg(long)]
    scenario: PathBuf,

    /// Scenario name within the manifest (defaults to the first)
    #[arg(long)]
    name: Option<String>,

    /// Write every body's elements about its primary as CSV (`-` for stdout)
    #[arg(long)]
    elements_csv: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_scenario(&cli.scenario, cli.name.as_deref())?;
    let mut ctx = SimulationContext::from_config(&config)?;
    let telemetry = ctx.observe()?;

    let tree = ctx
        .soi_tree()
        .ok_or_else(|| anyhow::anyhow!("no sphere-of-influence tree was built"))?;

    println!("=== Spheres of influence: {} ===", tree.scenario());
    for (depth, node) in tree.nodes() {
        println!("{:indent$}{} (r_soi = {:.6} AU)", "", node.name, node.soi_radius, indent = depth * 2);
    }

    println!();
    println!("=== Spacecraft at t = {:.4} yr ===", telemetry.epoch);
    println!("Current SOI    : {} (depth {})", telemetry.soi, telemetry.soi_depth);
    println!(
        "Speed          : {:.5} AU/yr, relative {:.5} AU/yr",
        telemetry.speed, telemetry.relative_speed
    );
    match &telemetry.elements {
        Some(el) => println!(
            "Elements       : a = {}, e = {}, i = {:.3}°, ω = {:.3}°, Ω = {:.3}°, ν = {:.3}°",
            el.a,
            el.e,
            el.i.to_degrees(),
            el.arg_p.to_degrees(),
            el.l_an.to_degrees(),
            el.true_anom.to_degrees()
        ),
        None => println!("Elements       : undefined for this geometry"),
    }
    if let Some(radius) = telemetry.target_soi_radius {
        println!("Target SOI     : {:.6} AU", radius);
    }

    if let Some(path) = &cli.elements_csv {
        let mut writer = writer_for_path(path)?;
        write_header(writer.as_mut())?;
        for (depth, node) in tree.nodes() {
            if depth == 0 {
                continue;
            }
            let primary = tree.primary_of(&node.name)?;
            let (Some(body), Some(parent)) =
                (find(&ctx.masses, &node.name), find(&ctx.masses, &primary.name))
            else {
                continue;
            };
            let relative = body.relative_to(parent);
            match state_to_kepler(relative.position, relative.velocity, ctx.g * parent.m) {
                Ok(elements) => Record {
                    epoch: ctx.elapsed_time,
                    body: &body.name,
                    primary: &parent.name,
                    elements: elements.rounded(ELEMENT_DECIMALS),
                }
                .write_to(writer.as_mut())?,
                Err(err) => warn!(body = %body.name, error = %err, "skipping body without elements"),
            }
        }
        writer.flush()?;
    }

    Ok(())
}
