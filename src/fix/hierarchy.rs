use std::collections::HashSet;

use super::{
    naming::SpineCandidates,
    skinning::ReweightPlan,
    types::{BoneAxes, FixReport, SpineCase, VendorFlags},
};
use crate::{
    rules::RuleSet,
    scene::{Armature, BoneId, Scene},
};

const EYE_BONES: [&str; 2] = ["Eye_L", "Eye_R"];
const NECK_OFFSET: f32 = 0.1;

// ─── Deletion and re-rooting ──────────────────────────────────────────────────

/// Remove bones on the deletion lists. A removed bone's weights are scheduled
/// to merge into its parent and its children move up to that parent.
/// Parentless matches stay so the root is never lost. Every surviving bone
/// is disconnected and its roll cleared.
pub(super) fn delete_marked_bones(
    armature: &mut Armature,
    rules: &RuleSet,
    plan: &mut ReweightPlan,
) -> Vec<String> {
    let mut removed = Vec::new();
    for id in armature.ids() {
        let Some(name) = armature.name(id).map(ToOwned::to_owned) else {
            continue;
        };
        if !rules.is_deletable(&name) {
            continue;
        }
        let Some(parent) = armature.parent(id) else {
            log::debug!("keeping parentless bone '{name}' from the deletion list");
            continue;
        };
        plan.schedule_removed(id, &name, parent);
        armature.remove_bone(id);
        removed.push(name);
    }

    for id in armature.ids() {
        if let Some(bone) = armature.bone_mut(id) {
            bone.use_connect = false;
            bone.roll = 0.0;
        }
    }
    removed
}

/// Make `Hips` the only root by hanging every other root below it.
pub(super) fn reroot_at_hips(armature: &mut Armature) {
    let Some(hips) = armature.find("Hips") else {
        return;
    };
    armature.set_parent(hips, None);
    for root in armature.roots() {
        if root != hips {
            armature.set_parent(root, Some(hips));
        }
    }
}

// ─── Spine ────────────────────────────────────────────────────────────────────

/// Pick the spine case from the number of spine candidates that have
/// children. A lone leaf part only matters when nothing else was found.
pub(super) fn classify_spine(
    candidates: &SpineCandidates,
    armature: &Armature,
    vendor: &VendorFlags,
) -> SpineCase {
    let has_neck = armature.contains("Neck");
    match candidates.spines.len() {
        0 if candidates.parts.len() == 1 && !has_neck => SpineCase::LeafOnly,
        0 => SpineCase::None,
        1 => SpineCase::Synthesize,
        2 => SpineCase::Rename2,
        4 if vendor.source_engine => SpineCase::SourceEngine4,
        _ => SpineCase::MergeN,
    }
}

/// Turn the spine candidates into `Spine` and `Chest` according to `case`.
pub(super) fn resolve_spine(
    scene: &mut Scene,
    case: SpineCase,
    candidates: &SpineCandidates,
    axes: &BoneAxes,
    plan: &mut ReweightPlan,
    report: &mut FixReport,
) {
    log::info!("spine case: {case:?}");
    let spines = &candidates.spines;
    match case {
        SpineCase::None => {}
        SpineCase::LeafOnly => {
            if let Some(part) = candidates.parts.first() {
                claim(scene, *part, "Spine", report);
            }
        }
        SpineCase::Synthesize => synthesize_chest(scene, spines[0], axes, report),
        SpineCase::Rename2 => {
            claim(scene, spines[0], "Spine", report);
            claim(scene, spines[1], "Chest", report);
        }
        SpineCase::SourceEngine4 => {
            claim(scene, spines[0], "Spine", report);
            claim(scene, spines[2], "Chest", report);
            attach_spine_to_chest(&mut scene.armature, spines[0], spines[2]);
            plan.schedule(spines[1], spines[0]);
            plan.schedule(spines[3], spines[2]);
        }
        SpineCase::MergeN => {
            let last = spines.len() - 1;
            claim(scene, spines[0], "Spine", report);
            claim(scene, spines[last], "Chest", report);
            attach_spine_to_chest(&mut scene.armature, spines[0], spines[last]);
            for middle in &spines[1..last] {
                plan.schedule(*middle, spines[0]);
            }
        }
    }
}

fn claim(scene: &mut Scene, id: BoneId, name: &str, report: &mut FixReport) {
    let Some(old) = scene.armature.name(id).map(ToOwned::to_owned) else {
        return;
    };
    if old == name {
        return;
    }
    if let Some(new) = scene.claim_bone_name(id, name) {
        report.renamed_bones.push((old, new));
    }
}

fn attach_spine_to_chest(armature: &mut Armature, spine: BoneId, chest: BoneId) {
    let Some(chest_head) = armature.bone(chest).map(|bone| bone.head) else {
        return;
    };
    if let Some(spine) = armature.bone_mut(spine) {
        spine.tail = chest_head;
    }
}

/// Split a single spine in two. The new `Chest` runs from halfway up the
/// spine (lateral position kept) to the neck, or to the old spine tip when
/// there is no neck, and adopts the spine's children.
fn synthesize_chest(scene: &mut Scene, spine: BoneId, axes: &BoneAxes, report: &mut FixReport) {
    let Some((spine_head, spine_tail)) = scene.armature.bone(spine).map(|b| (b.head, b.tail)) else {
        return;
    };
    let chest_top = scene
        .armature
        .find("Neck")
        .and_then(|neck| scene.armature.bone(neck))
        .map_or(spine_tail, |neck| neck.head);

    claim(scene, spine, "Spine", report);

    let mut chest_head = spine_head;
    for axis in [axes.y, axes.z] {
        chest_head[axis] = spine_head[axis] + (chest_top[axis] - spine_head[axis]) / 2.0;
    }

    let children = scene.armature.children(spine);
    let chest = scene.armature.add_bone("Chest", chest_head, chest_top);
    if scene.armature.name(chest) != Some("Chest") {
        scene.claim_bone_name(chest, "Chest");
    }
    report.created_bones.push("Chest".to_string());

    if let Some(bone) = scene.armature.bone_mut(spine) {
        bone.tail = chest_head;
    }
    scene.armature.set_parent(chest, Some(spine));
    for child in children {
        scene.armature.set_parent(child, Some(chest));
    }
}

// ─── Neck and eyes ────────────────────────────────────────────────────────────

/// Create `Neck` between `Chest` and `Head` when it is missing.
pub(super) fn synthesize_neck(armature: &mut Armature, axes: &BoneAxes) -> Option<String> {
    if armature.contains("Neck") {
        return None;
    }
    let chest = armature.find("Chest")?;
    let head = armature.find("Head")?;
    let neck_head = armature.bone(chest)?.tail;
    let mut neck_tail = armature.bone(head)?.head;
    if neck_tail[axes.z] == neck_head[axes.z] {
        neck_tail[axes.z] += NECK_OFFSET;
    }

    let neck = armature.add_bone("Neck", neck_head, neck_tail);
    armature.set_parent(neck, Some(chest));
    Some("Neck".to_string())
}

/// Schedule every descendant of each eye to merge into that eye.
pub(super) fn schedule_eye_children(armature: &Armature, plan: &mut ReweightPlan) {
    for eye_name in EYE_BONES {
        let Some(eye) = armature.find(eye_name) else {
            continue;
        };
        let mut visited = HashSet::from([eye]);
        collect_descendants(armature, eye, eye, plan, &mut visited);
    }
}

fn collect_descendants(
    armature: &Armature,
    bone: BoneId,
    eye: BoneId,
    plan: &mut ReweightPlan,
    visited: &mut HashSet<BoneId>,
) {
    for child in armature.children(bone) {
        if !visited.insert(child) {
            continue;
        }
        plan.schedule(child, eye);
        collect_descendants(armature, child, eye, plan, visited);
    }
}
