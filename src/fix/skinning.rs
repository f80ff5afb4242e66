use std::collections::HashSet;

use super::{progress::Progress, types::WeightMerge};
use crate::{
    rules::RuleSet,
    scene::{Armature, BoneId, Mesh, Scene},
};

// ─── Plans ────────────────────────────────────────────────────────────────────

/// Vertex-group merges scheduled by the structural passes. Sources and
/// targets are bones, so later renames are picked up when the merge runs.
/// Re-scheduling a source replaces its target but keeps its position.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct ReweightPlan {
    entries: Vec<ScheduledMerge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledMerge {
    source: BoneId,
    /// Name of a source bone that was deleted from the armature.
    removed: Option<String>,
    target: BoneId,
}

impl ReweightPlan {
    pub(super) fn schedule(&mut self, from: BoneId, to: BoneId) {
        self.insert(from, None, to);
    }

    /// Schedule the weights of a bone that is about to be deleted. Its vertex
    /// groups keep `name` until the merge runs.
    pub(super) fn schedule_removed(&mut self, from: BoneId, name: &str, to: BoneId) {
        self.insert(from, Some(name.to_string()), to);
    }

    fn insert(&mut self, source: BoneId, removed: Option<String>, target: BoneId) {
        match self.entries.iter_mut().find(|entry| entry.source == source) {
            Some(entry) => {
                entry.target = target;
                if removed.is_some() {
                    entry.removed = removed;
                }
            }
            None => self.entries.push(ScheduledMerge {
                source,
                removed,
                target,
            }),
        }
    }

    pub(super) fn target_of(&self, from: BoneId) -> Option<BoneId> {
        self.entries
            .iter()
            .find(|entry| entry.source == from)
            .map(|entry| entry.target)
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    fn source_name<'a>(&'a self, armature: &'a Armature, entry: &'a ScheduledMerge) -> Option<&'a str> {
        armature.name(entry.source).or(entry.removed.as_deref())
    }

    /// Follow merges into deleted bones until a live bone is reached.
    fn live_target(&self, armature: &Armature, target: BoneId) -> Option<BoneId> {
        let mut current = target;
        for _ in 0..=self.entries.len() {
            if armature.bone(current).is_some() {
                return Some(current);
            }
            current = self.target_of(current)?;
        }
        None
    }
}

/// Child → parent links applied once every mesh has been processed. The
/// first proposal for a child wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct ReparentPlan {
    entries: Vec<(String, String)>,
}

impl ReparentPlan {
    /// Start from the canonical skeleton links.
    pub(super) fn canonical(rules: &RuleSet) -> Self {
        let mut plan = Self::default();
        for (child, parent) in &rules.parenting {
            plan.propose(child, parent);
        }
        plan
    }

    pub(super) fn propose(&mut self, child: &str, parent: &str) {
        if !self.entries.iter().any(|(existing, _)| existing == child) {
            self.entries.push((child.to_string(), parent.to_string()));
        }
    }

    /// Link every pair whose bones both exist. Returns how many parents
    /// actually changed.
    pub(super) fn apply(&self, armature: &mut Armature) -> usize {
        let mut changed = 0;
        for (child, parent) in &self.entries {
            let (Some(child_id), Some(parent_id)) = (armature.find(child), armature.find(parent))
            else {
                continue;
            };
            if armature.parent(child_id) == Some(parent_id) {
                continue;
            }
            if armature.set_parent(child_id, Some(parent_id)) {
                changed += 1;
            }
        }
        changed
    }
}

// ─── Redistribution ───────────────────────────────────────────────────────────

/// Move the weights of merged and removed bones into their surviving bones on
/// every mesh.
///
/// Per mesh the order is: helper bones that fold into the nearest parent not
/// on that list, then the rename/reweight tables, then the merges scheduled
/// by the structural passes, which always land on the scheduled bone's
/// current name. Each merge proposes the merge target as the new
/// parent of the source bone's children.
pub(super) fn redistribute_weights(
    scene: &mut Scene,
    rules: &RuleSet,
    plan: &ReweightPlan,
    reparent: &mut ReparentPlan,
    progress: &mut Progress,
) -> Vec<WeightMerge> {
    let Scene { armature, meshes } = scene;
    let mut merges = Vec::new();

    for mesh in meshes.iter_mut() {
        for name in &rules.reweight_to_parent {
            let Some(bone) = armature.find_ci(name) else {
                continue;
            };
            let Some(target) = nearest_kept_parent(armature, rules, bone) else {
                continue;
            };
            let (Some(source), Some(target)) = (armature.name(bone), armature.name(target)) else {
                continue;
            };
            if !mesh.has_group(source) {
                continue;
            }
            mesh.ensure_group(target);
            merge_into(armature, mesh, source, target, reparent, &mut merges);
        }

        for rule in &rules.reweights {
            for source in &rule.sources {
                progress.step();
                let Some(group) = mesh.find_group_ci(source).map(ToOwned::to_owned) else {
                    continue;
                };
                if !prepare_target(armature, rules, mesh, &rule.target) {
                    continue;
                }
                merge_into(armature, mesh, &group, &rule.target, reparent, &mut merges);
            }
        }

        for entry in &plan.entries {
            progress.step();
            let Some(source) = plan.source_name(armature, entry) else {
                continue;
            };
            let Some(group) = mesh.find_group_ci(source).map(ToOwned::to_owned) else {
                continue;
            };
            let Some(target) = plan
                .live_target(armature, entry.target)
                .and_then(|id| armature.name(id))
            else {
                log::warn!("no surviving bone takes the weights of '{source}'");
                continue;
            };
            let target = mesh
                .find_group_ci(target)
                .map_or_else(|| target.to_string(), ToOwned::to_owned);
            mesh.ensure_group(&target);
            merge_into(armature, mesh, &group, &target, reparent, &mut merges);
        }
    }
    merges
}

/// Walk up from `bone`'s parent past every helper bone that is itself folded
/// into its parent.
fn nearest_kept_parent(
    armature: &Armature,
    rules: &RuleSet,
    bone: BoneId,
) -> Option<BoneId> {
    armature.ancestors(bone).into_iter().find(|ancestor| {
        armature
            .name(*ancestor)
            .is_some_and(|name| !rules.is_reweight_to_parent(name))
    })
}

/// Make sure `target` has a group on this mesh. Only protected bones that
/// exist in the armature get a fresh group.
fn prepare_target(armature: &Armature, rules: &RuleSet, mesh: &mut Mesh, target: &str) -> bool {
    if mesh.has_group(target) {
        return true;
    }
    if rules.is_protected(target) && armature.contains(target) {
        mesh.ensure_group(target);
        return true;
    }
    false
}

fn merge_into(
    armature: &Armature,
    mesh: &mut Mesh,
    source: &str,
    target: &str,
    reparent: &mut ReparentPlan,
    merges: &mut Vec<WeightMerge>,
) {
    if source == target {
        log::warn!("'{target}' tried to merge weights with itself, skipping");
        return;
    }
    if let Some(bone) = armature.find(source) {
        for child in armature.children(bone) {
            if let Some(child_name) = armature.name(child) {
                reparent.propose(child_name, target);
            }
        }
    }
    if let Some(weight) = mesh.merge_group_into(source, target) {
        log::debug!("merged '{source}' into '{target}' on '{}'", mesh.name);
        merges.push(WeightMerge {
            mesh: mesh.name.clone(),
            from: source.to_string(),
            to: target.to_string(),
            weight,
        });
    }
}

// ─── Cleanup ──────────────────────────────────────────────────────────────────

/// Drop vertex groups that no longer name a bone.
pub(super) fn remove_unused_groups(scene: &mut Scene) -> usize {
    let Scene { armature, meshes } = scene;
    let mut removed = 0;
    for mesh in meshes.iter_mut() {
        let before = mesh.vertex_groups.len();
        mesh.vertex_groups
            .retain(|group| armature.contains(&group.name));
        removed += before - mesh.vertex_groups.len();
    }
    removed
}

/// Delete bones that carry no weight on any mesh, together with their groups.
///
/// Protected bones, bones whose name contains `Root_` and, when
/// `keep_end_bones` is set, leaves that are the only child of their parent
/// are kept.
pub(super) fn delete_zero_weight_bones(
    scene: &mut Scene,
    rules: &RuleSet,
    keep_end_bones: bool,
) -> Vec<String> {
    let weighted: HashSet<String> = scene
        .meshes
        .iter()
        .flat_map(|mesh| mesh.vertex_groups.iter())
        .filter(|group| group.has_positive_weight())
        .map(|group| group.name.clone())
        .collect();

    let mut removed = Vec::new();
    for id in scene.armature.ids() {
        let Some(name) = scene.armature.name(id).map(ToOwned::to_owned) else {
            continue;
        };
        if weighted.contains(&name) || rules.is_protected(&name) || name.contains("Root_") {
            continue;
        }
        if keep_end_bones && is_end_bone(&scene.armature, id) {
            continue;
        }
        scene.armature.remove_bone(id);
        for mesh in &mut scene.meshes {
            mesh.remove_group(&name);
        }
        removed.push(name);
    }
    removed
}

fn is_end_bone(armature: &Armature, id: BoneId) -> bool {
    armature.children(id).is_empty()
        && armature
            .parent(id)
            .is_some_and(|parent| armature.children(parent).len() == 1)
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::logging::MemorySink;

    fn scene(bones: &[(&str, Option<&str>)], weights: &[(&str, usize, f32)]) -> Scene {
        let mut armature = Armature::new("Armature");
        for (name, _) in bones {
            armature.add_bone(name, Vector3::zeros(), Vector3::z());
        }
        for (name, parent) in bones {
            if let (Some(id), Some(parent)) = (armature.find(name), parent.and_then(|p| armature.find(p))) {
                armature.set_parent(id, Some(parent));
            }
        }
        let mut mesh = Mesh::new("Body");
        mesh.vertices = vec![Vector3::zeros(); 4];
        for (group, vertex, weight) in weights {
            mesh.set_weight(group, *vertex, *weight);
        }
        let mut scene = Scene::new(armature);
        scene.meshes.push(mesh);
        scene
    }

    fn totals(scene: &Scene) -> Vec<f32> {
        (0..4).map(|v| scene.meshes[0].vertex_weight_total(v)).collect()
    }

    fn id(scene: &Scene, name: &str) -> BoneId {
        scene.armature.find(name).expect(name)
    }

    fn run(scene: &mut Scene, plan: &ReweightPlan, reparent: &mut ReparentPlan) -> Vec<WeightMerge> {
        let mut sink = MemorySink::default();
        let mut progress = Progress::begin(&mut sink, 10_000);
        let merges = redistribute_weights(scene, RuleSet::standard(), plan, reparent, &mut progress);
        progress.end();
        merges
    }

    #[test]
    fn given_scheduled_merge_when_redistributing_then_vertex_totals_are_conserved() {
        let mut scene = scene(
            &[("Hips", None), ("Spine", Some("Hips")), ("Spine1", Some("Spine"))],
            &[("Spine", 0, 0.5), ("Spine1", 0, 0.5), ("Spine1", 1, 1.0), ("Hips", 2, 1.0)],
        );
        let before = totals(&scene);
        let mut plan = ReweightPlan::default();
        plan.schedule(id(&scene, "Spine1"), id(&scene, "Spine"));

        let merges = run(&mut scene, &plan, &mut ReparentPlan::default());

        assert_eq!(totals(&scene), before);
        assert!(!scene.meshes[0].has_group("Spine1"));
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].weight, 1.5);
    }

    #[test]
    fn given_helper_chain_when_reweighting_to_parent_then_nearest_kept_parent_receives_weights() {
        let mut scene = scene(
            &[
                ("Left elbow", None),
                ("Bip_L_Ulna", Some("Left elbow")),
                ("Bip_L_Wrist", Some("Bip_L_Ulna")),
                ("Finger", Some("Bip_L_Wrist")),
            ],
            &[("Bip_L_Wrist", 0, 0.4), ("Bip_L_Ulna", 0, 0.6)],
        );
        let mut reparent = ReparentPlan::default();

        run(&mut scene, &ReweightPlan::default(), &mut reparent);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.group("Left elbow").map(|g| g.weights[&0]), Some(1.0));
        assert!(!mesh.has_group("Bip_L_Wrist"));
        assert_eq!(reparent.apply(&mut scene.armature), 2);
        let finger = scene.armature.find("Finger").expect("finger");
        assert_eq!(scene.armature.name(scene.armature.parent(finger).expect("parent")), Some("Left elbow"));
    }

    #[test]
    fn given_leftover_alias_group_when_redistributing_then_protected_target_is_created() {
        let mut scene = scene(
            &[("Hips", None), ("Pelvis", Some("Hips"))],
            &[("Pelvis", 0, 1.0)],
        );

        run(&mut scene, &ReweightPlan::default(), &mut ReparentPlan::default());

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.group("Hips").map(|g| g.weights[&0]), Some(1.0));
        assert!(!mesh.has_group("Pelvis"));
    }

    #[test]
    fn given_deleted_bones_under_unweighted_parent_when_redistributing_then_parent_takes_their_weight() {
        let mut scene = scene(
            &[
                ("ParentNode", None),
                ("Center", Some("ParentNode")),
                ("Groove", Some("Center")),
                ("Hips", Some("Groove")),
            ],
            &[("Center", 0, 0.25), ("Groove", 0, 0.75), ("Groove", 1, 1.0), ("Hips", 2, 1.0)],
        );
        let before = totals(&scene);
        let (parent_node, center, groove) = (
            id(&scene, "ParentNode"),
            id(&scene, "Center"),
            id(&scene, "Groove"),
        );
        let mut plan = ReweightPlan::default();
        plan.schedule_removed(groove, "Groove", center);
        scene.armature.remove_bone(groove);
        plan.schedule_removed(center, "Center", parent_node);
        scene.armature.remove_bone(center);

        run(&mut scene, &plan, &mut ReparentPlan::default());

        let mesh = &scene.meshes[0];
        assert_eq!(totals(&scene), before);
        assert!(!mesh.has_group("Center"));
        assert!(!mesh.has_group("Groove"));
        let parent = mesh.group("ParentNode").expect("parent group created");
        assert_eq!(parent.weights[&0], 1.0);
        assert_eq!(parent.weights[&1], 1.0);
    }

    #[test]
    fn given_target_renamed_after_scheduling_when_redistributing_then_current_name_receives_weights() {
        let mut scene = scene(
            &[
                ("Hips", None),
                ("UpperBody2", Some("Hips")),
                ("ShoulderP_L", Some("UpperBody2")),
            ],
            &[("UpperBody2", 0, 0.5), ("ShoulderP_L", 0, 0.5), ("ShoulderP_L", 1, 1.0)],
        );
        let before = totals(&scene);
        let (upper, shoulder) = (id(&scene, "UpperBody2"), id(&scene, "ShoulderP_L"));
        let mut plan = ReweightPlan::default();
        plan.schedule_removed(shoulder, "ShoulderP_L", upper);
        scene.armature.remove_bone(shoulder);
        scene.rename_bone(upper, "Chest");

        let merges = run(&mut scene, &plan, &mut ReparentPlan::default());

        assert_eq!(totals(&scene), before);
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].to, "Chest");
        let chest = scene.meshes[0].group("Chest").expect("chest group");
        assert_eq!(chest.weights[&0], 1.0);
        assert_eq!(chest.weights[&1], 1.0);
    }

    #[test]
    fn given_self_merge_when_redistributing_then_nothing_changes() {
        let mut scene = scene(&[("Hips", None)], &[("Hips", 0, 1.0)]);
        let hips = id(&scene, "Hips");
        let mut plan = ReweightPlan::default();
        plan.schedule(hips, hips);

        let merges = run(&mut scene, &plan, &mut ReparentPlan::default());

        assert!(merges.is_empty());
        assert_eq!(scene.meshes[0].group("Hips").map(|g| g.weights[&0]), Some(1.0));
    }

    #[test]
    fn given_rescheduled_source_when_planning_then_last_target_wins_in_place() {
        let mut armature = Armature::new("Armature");
        let [a, b, c, d, e] =
            ["A", "B", "C", "D", "E"].map(|name| armature.add_bone(name, Vector3::zeros(), Vector3::z()));
        let mut plan = ReweightPlan::default();
        plan.schedule(a, b);
        plan.schedule(c, d);
        plan.schedule(a, e);
        assert_eq!(plan.target_of(a), Some(e));
        assert_eq!(plan.entries[0].source, a);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn given_canonical_plan_when_applying_then_cycles_and_missing_bones_are_skipped() {
        let mut scene = scene(
            &[("Hips", None), ("Chest", Some("Hips")), ("Spine", Some("Chest"))],
            &[],
        );
        let plan = ReparentPlan::canonical(RuleSet::standard());

        let changed = plan.apply(&mut scene.armature);

        let armature = &scene.armature;
        let spine = armature.find("Spine").expect("spine");
        let chest = armature.find("Chest").expect("chest");
        // Spine -> Hips is applied first, which then allows Chest -> Spine.
        assert_eq!(changed, 2);
        assert_eq!(armature.name(armature.parent(chest).expect("parent")), Some("Spine"));
        assert_eq!(armature.name(armature.parent(spine).expect("parent")), Some("Hips"));
    }

    #[test]
    fn given_unweighted_bones_when_deleting_zero_weight_then_protected_and_roots_survive() {
        let mut scene = scene(
            &[
                ("Hips", None),
                ("Root_Tail", Some("Hips")),
                ("Ribbon", Some("Hips")),
                ("Ribbon_End", Some("Ribbon")),
                ("Loose", Some("Hips")),
            ],
            &[("Ribbon", 0, 1.0), ("Loose", 1, 0.0)],
        );
        let mut without_end_bones = scene.clone();

        let removed = delete_zero_weight_bones(&mut scene, RuleSet::standard(), true);

        assert_eq!(removed, vec!["Loose".to_string()]);
        assert!(scene.armature.contains("Ribbon_End"));
        assert!(scene.armature.contains("Root_Tail"));
        assert!(!scene.meshes[0].has_group("Loose"));

        let removed = delete_zero_weight_bones(&mut without_end_bones, RuleSet::standard(), false);
        assert_eq!(removed, vec!["Ribbon_End".to_string(), "Loose".to_string()]);
    }

    #[test]
    fn given_groups_without_bones_when_cleaning_then_they_are_removed() {
        let mut scene = scene(&[("Hips", None)], &[("Hips", 0, 1.0), ("Ghost", 1, 1.0)]);
        assert_eq!(remove_unused_groups(&mut scene), 1);
        assert!(scene.meshes[0].has_group("Hips"));
    }
}
