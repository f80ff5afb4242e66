use std::f32::consts::PI;

use nalgebra::{Rotation3, Vector3};

use super::types::BoneAxes;
use crate::scene::{Armature, BoneId, Scene};

const LENGTH_NUDGE: f32 = 0.1;
const CONNECT_TOLERANCE: f32 = 0.005;
const ZERO_LENGTH_PRECISION: f32 = 100_000.0;
const UNCONNECTED_BONES: [&str; 4] = ["Eye_L", "Eye_R", "Head", "Hips"];

// ─── Bone shapes ──────────────────────────────────────────────────────────────

/// Raise the tail of every bone whose head and tail agree to five decimals.
pub(super) fn fix_zero_length_bones(armature: &mut Armature, axes: &BoneAxes) -> usize {
    let mut fixed = 0;
    for id in armature.ids() {
        let Some(bone) = armature.bone_mut(id) else {
            continue;
        };
        let same = (0..3).all(|axis| {
            (bone.head[axis] * ZERO_LENGTH_PRECISION).round()
                == (bone.tail[axis] * ZERO_LENGTH_PRECISION).round()
        });
        if same {
            bone.tail[axes.z] += LENGTH_NUDGE;
            fixed += 1;
        }
    }
    fixed
}

/// Point the head bone straight up.
pub(super) fn straighten_head(armature: &mut Armature, axes: &BoneAxes) {
    let Some(head) = armature.find("Head").and_then(|id| armature.bone_mut(id)) else {
        return;
    };
    head.tail[axes.x] = head.head[axes.x];
    head.tail[axes.y] = head.head[axes.y];
    if head.tail[axes.z] <= head.head[axes.z] {
        head.tail[axes.z] = head.head[axes.z] + LENGTH_NUDGE;
    }
}

/// Reposition the hips between the legs. With full-body tracking the hips
/// point down and the legs get a second bone for the tracker; the names of
/// the bones created for that are returned.
pub(super) fn fix_hips(scene: &mut Scene, axes: &BoneAxes, full_body_tracking: bool) -> Vec<String> {
    let armature = &scene.armature;
    let (Some(hips), Some(spine), Some(left_leg), Some(right_leg)) = (
        armature.find("Hips"),
        armature.find("Spine"),
        armature.find("Left leg"),
        armature.find("Right leg"),
    ) else {
        return Vec::new();
    };
    let head_of = |id: BoneId| armature.bone(id).map(|bone| bone.head);
    let (Some(spine_head), Some(left_head), Some(right_head)) =
        (head_of(spine), head_of(left_leg), head_of(right_leg))
    else {
        return Vec::new();
    };

    if !full_body_tracking {
        if let Some(bone) = scene.armature.bone_mut(hips) {
            let middle = (left_head[axes.x] + right_head[axes.x]) / 2.0;
            bone.head[axes.x] = middle;
            bone.tail[axes.x] = middle;
            bone.head[axes.y] = right_head[axes.y];
            bone.tail[axes.y] = right_head[axes.y];
            bone.head[axes.z] = right_head[axes.z];
            bone.tail[axes.z] = spine_head[axes.z];
            if bone.tail[axes.z] < bone.head[axes.z] {
                bone.tail[axes.z] += LENGTH_NUDGE;
            }
        }
        return Vec::new();
    }

    if let Some(bone) = scene.armature.bone_mut(hips) {
        bone.head = spine_head;
        bone.tail = spine_head;
        bone.tail[axes.z] = left_head[axes.z];
        if bone.tail[axes.z] > bone.head[axes.z] {
            bone.tail[axes.z] -= LENGTH_NUDGE;
        }
    }

    let mut created = Vec::new();
    for (leg, side) in [(left_leg, "Left"), (right_leg, "Right")] {
        let name = format!("{side} leg 2");
        let legacy = format!("{side}_Leg_2");
        let second = match (scene.armature.find(&name), scene.armature.find(&legacy)) {
            (Some(existing), _) => existing,
            (None, Some(legacy_id)) => {
                scene.rename_bone(legacy_id, &name);
                legacy_id
            }
            (None, None) => {
                created.push(name.clone());
                scene.armature.add_bone(&name, Vector3::zeros(), Vector3::zeros())
            }
        };

        let Some((head, tail)) = scene.armature.bone(leg).map(|bone| (bone.head, bone.tail)) else {
            continue;
        };
        if let Some(bone) = scene.armature.bone_mut(second) {
            bone.head = head;
            bone.tail = tail;
        }
        scene.armature.set_parent(second, Some(hips));
        if let Some(bone) = scene.armature.bone_mut(leg) {
            bone.tail = head;
            bone.tail[axes.z] = head[axes.z] + LENGTH_NUDGE;
        }
    }
    created
}

/// Flip an upside-down import. Returns `true` when the rig was rotated.
pub(super) fn correct_world_orientation(scene: &mut Scene, axes: &BoneAxes) -> bool {
    if axes.fbx {
        return false;
    }
    let armature = &scene.armature;
    let Some(hips_head) = armature.find("Hips").and_then(|id| armature.bone(id)).map(|b| b.head) else {
        return false;
    };
    if armature.to_world(&hips_head).z >= 0.0 {
        return false;
    }

    let flip = Rotation3::from_axis_angle(&Vector3::x_axis(), -PI).to_homogeneous();
    scene.armature.matrix_world = flip * scene.armature.matrix_world;
    for mesh in &mut scene.meshes {
        mesh.rotation_euler = Vector3::new(PI, 0.0, 0.0);
    }
    log::info!("armature was upside down, rotated 180 degrees around X");
    true
}

/// Point single-child bones at their child. A bone whose tail moved is
/// connected when it is its parent's only child, which puts its head on the
/// parent's tail. Returns how many bones were connected.
pub(super) fn connect_bones(armature: &mut Armature) -> usize {
    let mut connected = 0;
    for id in armature.ids() {
        let Some(name) = armature.name(id) else {
            continue;
        };
        if UNCONNECTED_BONES.contains(&name) {
            continue;
        }
        let children = armature.children(id);
        let [child] = children.as_slice() else {
            continue;
        };
        let Some(child_head) = armature.bone(*child).map(|bone| bone.head) else {
            continue;
        };
        let parent_tail = armature
            .parent(id)
            .filter(|parent| armature.children(*parent).len() == 1)
            .and_then(|parent| armature.bone(parent))
            .map(|parent| parent.tail);

        let Some(bone) = armature.bone_mut(id) else {
            continue;
        };
        if (child_head - bone.tail).norm() <= CONNECT_TOLERANCE {
            continue;
        }
        bone.tail = child_head;
        if let Some(parent_tail) = parent_tail {
            bone.head = parent_tail;
            bone.use_connect = true;
            connected += 1;
        }
    }
    connected
}

// ─── Meshes ───────────────────────────────────────────────────────────────────

/// Strip numeric duplicate suffixes such as `.001` from material names and
/// drop repeated slots. Returns the number of slots removed.
pub(super) fn combine_materials(scene: &mut Scene) -> usize {
    let mut removed = 0;
    for mesh in &mut scene.meshes {
        let mut combined: Vec<String> = Vec::with_capacity(mesh.materials.len());
        for material in mesh.materials.drain(..) {
            let base = strip_duplicate_suffix(&material).to_string();
            if combined.contains(&base) {
                removed += 1;
            } else {
                combined.push(base);
            }
        }
        mesh.materials = combined;
    }
    removed
}

fn strip_duplicate_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, suffix))
            if !base.is_empty() && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

/// Merge every mesh into the first one and return the names that were
/// absorbed.
pub(super) fn join_meshes(scene: &mut Scene) -> Vec<String> {
    if scene.meshes.len() < 2 {
        return Vec::new();
    }
    let others: Vec<_> = scene.meshes.drain(1..).collect();
    let names = others.iter().map(|mesh| mesh.name.clone()).collect();
    if let Some(first) = scene.meshes.first_mut() {
        for mesh in others {
            first.join(mesh);
        }
    }
    names
}

/// Replace NaN UV components with zero; returns how many were replaced.
pub(super) fn repair_uvs(scene: &mut Scene) -> usize {
    let mut repaired = 0;
    for mesh in &mut scene.meshes {
        for layer in &mut mesh.uv_layers {
            for component in layer.coords.iter_mut().flatten() {
                if component.is_nan() {
                    *component = 0.0;
                    repaired += 1;
                }
            }
        }
    }
    repaired
}
