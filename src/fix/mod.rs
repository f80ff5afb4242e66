//! Armature normalization pipeline.
//!
//! [`fix_armature`] takes an imported rig from whatever exporter produced it
//! to the canonical skeleton: standard bone names, a single `Hips` root, a
//! `Spine`/`Chest`/`Neck`/`Head` chain and weights merged onto the bones that
//! survive. A run that cannot reach a valid skeleton leaves the scene as it
//! found it.

mod geometry;
mod hierarchy;
mod naming;
mod progress;
mod skinning;
mod types;
mod validation;
mod vendor;

pub use naming::normalize_name;
pub use types::{
    BoneAxes, FixOptions, FixOutcome, FixReport, Severity, SpineCase, ValidationIssue,
    VendorFlags, WeightMerge,
};
pub use validation::HierarchyError;

use crate::{
    error::FixError,
    logging::{LogLevel, MessageSink},
    rules::RuleSet,
    scene::Scene,
};
use progress::Progress;
use skinning::{ReparentPlan, ReweightPlan};

const ARMATURE_NAME: &str = "Armature";

// ─── Public API ───────────────────────────────────────────────────────────────

/// Host-level gate run before [`fix_armature`].
pub fn check_preconditions(scene: &Scene) -> Result<(), FixError> {
    if scene.armature.is_empty() {
        return Err(FixError::NoArmature);
    }
    if scene.meshes.is_empty() {
        return Err(FixError::NoMeshes);
    }
    Ok(())
}

/// Normalize `scene` in place.
///
/// Never fails: missing bones skip the steps that need them, and a skeleton
/// that still lacks required bones afterwards is rolled back and reported as
/// [`FixOutcome::ValidationFailed`].
pub fn fix_armature(
    scene: &mut Scene,
    options: &FixOptions,
    sink: &mut dyn MessageSink,
) -> FixOutcome {
    let rules = RuleSet::standard();
    let snapshot = scene.snapshot();
    let mut report = FixReport::default();

    // ─── Preparation ─────────────────────────────────────────────────────────

    let vendor = vendor::classify_vendor(scene, options);
    let axes = vendor::detect_bone_axes(&scene.armature);
    log::info!("vendor flags: {vendor:?}, bone axes: {axes:?}");
    report.vendor = vendor;
    report.axes = axes;

    for removed in vendor::remove_physics_objects(scene) {
        log::info!("removed physics object '{removed}'");
    }
    if vendor.source_engine {
        for removed in vendor::cleanup_source_engine(scene) {
            log::info!("removed source engine helper mesh '{removed}'");
        }
    }

    geometry::fix_zero_length_bones(&mut scene.armature, &axes);
    if options.combine_materials {
        let removed = geometry::combine_materials(scene);
        log::debug!("combined {removed} duplicate material slots");
    }
    if options.join_meshes {
        let joined = geometry::join_meshes(scene);
        log::debug!("joined meshes: {joined:?}");
    }
    report.repaired_uv_coordinates = geometry::repair_uvs(scene);
    if vendor.daz {
        vendor::cleanup_daz(scene);
    }

    let extra_steps = scene.armature.len() + rules.delete.len();
    let mut progress = Progress::begin(sink, rules.progress_steps(extra_steps));

    // ─── Naming ──────────────────────────────────────────────────────────────

    naming::standardize_names(scene, &mut progress);
    report
        .renamed_bones
        .extend(naming::resolve_conflicts(scene, rules));
    let (renamed, candidates) = naming::apply_renames(scene, rules, &mut progress);
    report.renamed_bones.extend(renamed);
    report
        .renamed_bones
        .extend(naming::infer_unknown_sides(scene, rules));

    // ─── Hierarchy ───────────────────────────────────────────────────────────

    let mut plan = ReweightPlan::default();
    progress.advance(rules.delete.len());
    report.removed_bones = hierarchy::delete_marked_bones(&mut scene.armature, rules, &mut plan);
    hierarchy::reroot_at_hips(&mut scene.armature);

    report.spine_case = hierarchy::classify_spine(&candidates, &scene.armature, &vendor);
    hierarchy::resolve_spine(
        scene,
        report.spine_case,
        &candidates,
        &axes,
        &mut plan,
        &mut report,
    );
    if let Some(neck) = hierarchy::synthesize_neck(&mut scene.armature, &axes) {
        report.created_bones.push(neck);
    }
    geometry::straighten_head(&mut scene.armature, &axes);
    if !vendor.mixamo {
        let created = geometry::fix_hips(scene, &axes, vendor.full_body_tracking);
        report.created_bones.extend(created);
    }
    hierarchy::schedule_eye_children(&scene.armature, &mut plan);
    geometry::correct_world_orientation(scene, &axes);
    geometry::fix_zero_length_bones(&mut scene.armature, &axes);

    // ─── Weights ─────────────────────────────────────────────────────────────

    let mut reparent = ReparentPlan::canonical(rules);
    report.merges = skinning::redistribute_weights(scene, rules, &plan, &mut reparent, &mut progress);
    report.reparented = reparent.apply(&mut scene.armature);
    let unused = skinning::remove_unused_groups(scene);
    log::debug!("removed {unused} unused vertex groups");
    if options.remove_zero_weight {
        report.removed_zero_weight =
            skinning::delete_zero_weight_bones(scene, rules, options.keep_end_bones);
    }
    if options.connect_bones {
        geometry::connect_bones(&mut scene.armature);
    }

    // ─── Validation ──────────────────────────────────────────────────────────

    if let Err(error) = validation::validate_hierarchy(
        &scene.armature,
        &rules.required_chains,
        options.check_parenting,
    ) {
        progress.report(LogLevel::Error, &error.message);
        progress.end();
        scene.restore(snapshot);
        log::warn!("validation failed, scene restored");
        return FixOutcome::ValidationFailed {
            message: error.message,
        };
    }

    scene.armature.name = ARMATURE_NAME.to_string();
    report.bone_count = scene.armature.len();
    report.mesh_count = scene.meshes.len();

    if report.repaired_uv_coordinates > 0 {
        let message = format!(
            "The model was successfully fixed, but there were {} faulty UV coordinates.",
            report.repaired_uv_coordinates
        );
        report.issues.push(ValidationIssue::new(
            Severity::Warning,
            "FAULTY_UV_COORDINATES",
            message.clone(),
        ));
        progress.report(LogLevel::Warn, &message);
        progress.end();
        return FixOutcome::Warning { message, report };
    }

    progress.report(LogLevel::Info, "Model successfully fixed.");
    progress.end();
    FixOutcome::Fixed(report)
}
