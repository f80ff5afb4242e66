use std::{
    env,
    path::{Path, PathBuf},
    process,
};

use anyhow::Context;
use rigfix::{
    ConsoleSink, FixOutcome, FixReport, check_preconditions, fix_armature, init_logging,
    project::{FixSettings, load_fix_settings},
    scene::document::{read_scene, write_scene},
};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(3),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the rig failed validation and was left unchanged.
fn run() -> anyhow::Result<bool> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Usage: rigfix <input.json> <output.json> [settings.json]");
        process::exit(2);
    }

    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);
    let settings = match args.get(3) {
        Some(path) => load_fix_settings(Path::new(path))?,
        None => FixSettings::default(),
    };
    init_logging(settings.log_level());

    let mut scene = read_scene(&input)?;
    check_preconditions(&scene)
        .with_context(|| format!("cannot fix armature in {}", input.display()))?;

    let outcome = fix_armature(&mut scene, &settings.options, &mut ConsoleSink);
    write_scene(&output, &scene)?;

    let Some(report) = outcome.report() else {
        if let FixOutcome::ValidationFailed { message } = &outcome {
            println!("{message}");
        }
        return Ok(false);
    };
    print_summary(report);
    if settings.write_report {
        write_report(&output.with_extension("report.json"), report)?;
    }
    Ok(true)
}

fn print_summary(report: &FixReport) {
    let vendor = &report.vendor;
    println!(
        "Vendor: source engine {}, DAZ {}, Mixamo {}, full-body tracking {}",
        vendor.source_engine, vendor.daz, vendor.mixamo, vendor.full_body_tracking
    );
    println!("Spine case: {:?}", report.spine_case);
    println!("Bones: {}, Meshes: {}", report.bone_count, report.mesh_count);
    println!(
        "Renamed: {}, Created: {}, Removed: {}",
        report.renamed_bones.len(),
        report.created_bones.len(),
        report.removed_bones.len() + report.removed_zero_weight.len()
    );
    println!("Merged vertex groups: {}", report.merges.len());
    if !report.created_bones.is_empty() {
        println!("Created bones: {}", report.created_bones.join(", "));
    }
    if report.repaired_uv_coordinates > 0 {
        println!("Repaired UV coordinates: {}", report.repaired_uv_coordinates);
    }
}

fn write_report(path: &Path, report: &FixReport) -> anyhow::Result<()> {
    let content =
        serde_json::to_string_pretty(report).context("failed to serialize fix report as JSON")?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write fix report: {}", path.display()))?;
    Ok(())
}
