use std::fs;

use orrery::export::elements::{Record, write_header};
use orrery::export::trajectory::{TrajectoryReport, write_report};
use orrery::export::writer_for_path;
use orrery::orbits::state_to_kepler;
use orrery::transfer::{TrajectoryOptions, TrajectoryPlanner};
use tempfile::tempdir;

mod common;
use common::{G, inner_system};

#[test]
fn elements_csv_has_header_and_rounded_rows() {
    let ctx = inner_system();
    let sun = &ctx.masses[1];
    let earth = ctx.masses[2].relative_to(sun);
    let elements = state_to_kepler(earth.position, earth.velocity, G * sun.m)
        .expect("elements")
        .rounded(5);

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested/elements.csv");
    {
        let mut writer = writer_for_path(&path).expect("writer");
        write_header(writer.as_mut()).expect("header");
        Record {
            epoch: 0.0,
            body: "Earth",
            primary: "Sun",
            elements,
        }
        .write_to(writer.as_mut())
        .expect("row");
    }

    let csv = fs::read_to_string(&path).expect("read csv");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("epoch,body,primary,a,e,i,arg_p,l_an,true_anom,ecc_anom,mean_anom")
    );
    let row: Vec<&str> = lines.next().expect("row").split(',').collect();
    assert_eq!(row.len(), 11);
    assert_eq!(&row[..3], &["0", "Earth", "Sun"]);
    assert_eq!(row[3], "1");
    assert!(lines.next().is_none());
}

#[test]
fn trajectory_report_serializes_plan() {
    let mut ctx = inner_system();
    let outcome = TrajectoryPlanner::new()
        .plan(
            &mut ctx,
            TrajectoryOptions {
                correction: false,
                apply: false,
            },
        )
        .expect("plan");

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("report.json");
    {
        let mut writer = writer_for_path(&path).expect("writer");
        write_report(writer.as_mut(), &TrajectoryReport::new(&ctx.scenario, &outcome)).expect("report");
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read json")).expect("parse json");
    assert_eq!(json["scenario"], "Inner");
    assert_eq!(json["state"], "Discarded");
    assert_eq!(json["reference"], "Sun");
    assert_eq!(json["target"], "Mars");
    assert!((json["time_of_flight"].as_f64().expect("tof") - 0.7).abs() < 1e-12);
    assert!(json["departure_delta_v_km_s"].as_f64().expect("dv") > 0.0);
    assert!(json["departure_velocity"]["x"].is_number());
}
