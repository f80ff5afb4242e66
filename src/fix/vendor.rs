use nalgebra::{Point3, Vector3};

use super::types::{BoneAxes, FixOptions, VendorFlags};
use crate::scene::{Armature, Scene};

const SOURCE_ENGINE_PREFIX: &str = "ValveBiped";
const SOURCE_ENGINE_ACTION: &str = "ragdoll";
const SOURCE_ENGINE_VTA_MESH: &str = "VTA vertices";
const SOURCE_ENGINE_EXTRA_SUFFIXES: [&str; 7] = [
    "_physics", "_lod1", "_lod2", "_lod3", "_lod4", "_lod5", "_lod6",
];
const PHYSICS_OBJECT_MARKERS: [&str; 2] = ["rigidbodies", "joints"];
const DAZ_SCALE: f32 = 0.01;
const DAZ_SCALE_TOLERANCE: f32 = 0.005;

// ─── Classification ───────────────────────────────────────────────────────────

/// Inspect bone names, actions, mesh names and the armature scale.
///
/// Never fails; an unknown rig leaves every flag but the caller-provided
/// full-body-tracking switch unset.
pub(super) fn classify_vendor(scene: &Scene, options: &FixOptions) -> VendorFlags {
    let armature = &scene.armature;
    let source_engine = armature
        .bones()
        .any(|(_, bone)| bone.name().starts_with(SOURCE_ENGINE_PREFIX))
        || armature.animation_action.as_deref() == Some(SOURCE_ENGINE_ACTION)
        || scene.mesh(SOURCE_ENGINE_VTA_MESH).is_some();

    let scale = armature.scale();
    let daz = scale
        .iter()
        .all(|axis| (axis - DAZ_SCALE).abs() < DAZ_SCALE_TOLERANCE);

    // Raw names, case-insensitive: normalization drops the "mixamorig:"
    // namespace, and exporters also write "Mixamorig_" and "mixamorig1:".
    let mixamo = armature
        .bones()
        .any(|(_, bone)| bone.name().to_ascii_lowercase().contains("mixamo"));

    VendorFlags {
        source_engine,
        daz,
        mixamo,
        full_body_tracking: options.full_body_tracking,
    }
}

/// Decide which armature-space axis points up in the world.
///
/// Y-up exports carry a world rotation that maps local Y closer to world Z
/// than local Z; such rigs are treated as FBX-sourced.
pub(super) fn detect_bone_axes(armature: &Armature) -> BoneAxes {
    let m = &armature.matrix_world;
    let local_y = Vector3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let local_z = Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
    let (Some(local_y), Some(local_z)) = (
        local_y.try_normalize(f32::EPSILON),
        local_z.try_normalize(f32::EPSILON),
    ) else {
        return BoneAxes::default();
    };

    if local_y.z.abs() > local_z.z.abs() {
        BoneAxes {
            x: 0,
            y: 2,
            z: 1,
            fbx: true,
        }
    } else {
        BoneAxes::default()
    }
}

// ─── Cleanup ──────────────────────────────────────────────────────────────────

/// Drop physics helper objects that some importers parent to the armature.
pub(super) fn remove_physics_objects(scene: &mut Scene) -> Vec<String> {
    let doomed: Vec<String> = scene
        .meshes
        .iter()
        .filter(|mesh| {
            PHYSICS_OBJECT_MARKERS
                .iter()
                .any(|marker| mesh.name.contains(marker))
        })
        .map(|mesh| mesh.name.clone())
        .collect();
    for name in &doomed {
        scene.remove_mesh(name);
    }
    doomed
}

/// Clear the ragdoll action and delete the VTA, physics and LOD meshes of a
/// source-engine rig. At least one mesh is always kept.
pub(super) fn cleanup_source_engine(scene: &mut Scene) -> Vec<String> {
    if scene.armature.animation_action.as_deref() == Some(SOURCE_ENGINE_ACTION) {
        scene.armature.animation_action = None;
    }

    let mut removed = Vec::new();
    if scene.remove_mesh(SOURCE_ENGINE_VTA_MESH).is_some() {
        removed.push(SOURCE_ENGINE_VTA_MESH.to_string());
    }

    let candidates: Vec<String> = scene
        .meshes
        .iter()
        .filter(|mesh| {
            SOURCE_ENGINE_EXTRA_SUFFIXES
                .iter()
                .any(|suffix| mesh.name.ends_with(suffix))
        })
        .map(|mesh| mesh.name.clone())
        .collect();
    for name in candidates {
        if scene.meshes.len() <= 1 {
            break;
        }
        if scene.remove_mesh(&name).is_some() {
            removed.push(name);
        }
    }
    removed
}

/// Bake the armature transform into bones and vertices and clear actions.
pub(super) fn cleanup_daz(scene: &mut Scene) {
    let matrix = scene.armature.apply_transform();
    scene.armature.animation_action = None;
    for mesh in &mut scene.meshes {
        for vertex in &mut mesh.vertices {
            *vertex = matrix.transform_point(&Point3::from(*vertex)).coords;
        }
        mesh.animation_action = None;
    }
}
