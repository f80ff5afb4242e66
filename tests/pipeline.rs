use std::{collections::BTreeSet, env, fs, process};

use nalgebra::{Matrix4, Vector3};
use pretty_assertions::assert_eq;
use rigfix::{
    Armature, FixOptions, FixOutcome, FixReport, MemorySink, Mesh, Scene, fix_armature,
    fix::SpineCase,
    scene::document::{read_scene, write_scene},
};

// ─── Rig construction ─────────────────────────────────────────────────────────

struct BoneSpec {
    name: String,
    parent: Option<String>,
    head: [f32; 3],
    tail: [f32; 3],
}

fn spec(name: &str, parent: Option<&str>, head: [f32; 3], tail: [f32; 3]) -> BoneSpec {
    BoneSpec {
        name: name.to_string(),
        parent: parent.map(ToOwned::to_owned),
        head,
        tail,
    }
}

/// Exporter names for one humanoid. `limbs` holds shoulder, arm, elbow,
/// wrist, leg, knee and ankle patterns where `{}` is replaced by the side
/// token.
struct Naming<'a> {
    hips: &'a str,
    hips_parent: Option<&'a str>,
    spine_parent: Option<&'a str>,
    spines: &'a [&'a str],
    neck: &'a str,
    head: &'a str,
    limbs: [&'a str; 7],
    sides: [&'a str; 2],
}

fn humanoid(naming: &Naming) -> Vec<BoneSpec> {
    let mut bones = vec![spec(naming.hips, naming.hips_parent, [0.0, 0.0, 1.0], [0.0, 0.0, 1.1])];

    let step = 0.35 / naming.spines.len() as f32;
    let mut previous = naming.spine_parent.unwrap_or(naming.hips);
    for (index, name) in naming.spines.iter().enumerate() {
        let bottom = 1.1 + step * index as f32;
        bones.push(spec(name, Some(previous), [0.0, 0.0, bottom], [0.0, 0.0, bottom + step]));
        previous = *name;
    }
    let chest = previous;
    bones.push(spec(naming.neck, Some(chest), [0.0, 0.0, 1.45], [0.0, 0.0, 1.55]));
    bones.push(spec(naming.head, Some(naming.neck), [0.0, 0.0, 1.55], [0.0, 0.0, 1.75]));

    for (side, direction) in naming.sides.iter().zip([1.0_f32, -1.0]) {
        let [shoulder, arm, elbow, wrist, leg, knee, ankle] =
            naming.limbs.map(|pattern| pattern.replace("{}", side));
        let x = |value: f32| value * direction;
        bones.push(spec(&shoulder, Some(chest), [x(0.05), 0.0, 1.42], [x(0.15), 0.0, 1.42]));
        bones.push(spec(&arm, Some(shoulder.as_str()), [x(0.15), 0.0, 1.42], [x(0.4), 0.0, 1.42]));
        bones.push(spec(&elbow, Some(arm.as_str()), [x(0.4), 0.0, 1.42], [x(0.65), 0.0, 1.42]));
        bones.push(spec(&wrist, Some(elbow.as_str()), [x(0.65), 0.0, 1.42], [x(0.72), 0.0, 1.42]));
        bones.push(spec(&leg, Some(naming.hips), [x(0.1), 0.0, 0.95], [x(0.1), 0.0, 0.5]));
        bones.push(spec(&knee, Some(leg.as_str()), [x(0.1), 0.0, 0.5], [x(0.1), 0.0, 0.1]));
        bones.push(spec(&ankle, Some(knee.as_str()), [x(0.1), 0.0, 0.1], [x(0.1), -0.1, 0.0]));
    }
    bones
}

/// Build a scene with one `Body` mesh holding one fully weighted vertex per
/// bone, except for the bones listed in `unweighted`.
fn build(bones: &[BoneSpec], unweighted: &[&str]) -> Scene {
    let mut armature = Armature::new("Imported");
    for bone in bones {
        armature.add_bone(&bone.name, bone.head.into(), bone.tail.into());
    }
    for bone in bones {
        let parent = bone.parent.as_deref().and_then(|name| armature.find(name));
        if let (Some(id), Some(parent)) = (armature.find(&bone.name), parent) {
            armature.set_parent(id, Some(parent));
        }
    }

    let mut body = Mesh::new("Body");
    for bone in bones.iter().filter(|bone| !unweighted.contains(&bone.name.as_str())) {
        let vertex = body.vertices.len();
        body.vertices.push(Vector3::from(bone.head));
        body.set_weight(&bone.name, vertex, 1.0);
    }
    let mut scene = Scene::new(armature);
    scene.meshes.push(body);
    scene
}

// ─── Assertions ───────────────────────────────────────────────────────────────

fn fixed(outcome: FixOutcome) -> FixReport {
    match outcome {
        FixOutcome::Fixed(report) => report,
        other => panic!("expected a fixed rig, got {other:?}"),
    }
}

fn parent_of(scene: &Scene, name: &str) -> Option<String> {
    let armature = &scene.armature;
    let id = armature.find(name)?;
    armature
        .parent(id)
        .and_then(|parent| armature.name(parent))
        .map(ToOwned::to_owned)
}

fn assert_single_rooted_tree(scene: &Scene) {
    let armature = &scene.armature;
    let roots = armature.roots();
    assert_eq!(roots.len(), 1, "roots: {:?}", armature.names());
    assert_eq!(armature.name(roots[0]), Some("Hips"));
    for id in armature.ids() {
        assert!(!armature.ancestors(id).contains(&id));
    }
}

fn assert_canonical_limbs(scene: &Scene) {
    for side in ["Left", "Right"] {
        for part in ["shoulder", "arm", "elbow", "wrist", "leg", "knee", "ankle"] {
            let name = format!("{side} {part}");
            assert!(scene.armature.contains(&name), "{name} missing");
        }
    }
}

fn total_weight(scene: &Scene) -> f32 {
    scene
        .meshes
        .iter()
        .flat_map(|mesh| mesh.vertex_groups.iter())
        .map(|group| group.total())
        .sum()
}

fn strict() -> FixOptions {
    FixOptions {
        check_parenting: true,
        ..FixOptions::default()
    }
}

// ─── Rigs ─────────────────────────────────────────────────────────────────────

fn mmd_bones() -> Vec<BoneSpec> {
    let mut bones = vec![
        spec("ParentNode", None, [0.0; 3], [0.0, 0.0, 0.2]),
        spec("Center", Some("ParentNode"), [0.0, 0.0, 0.8], [0.0, 0.0, 0.9]),
        spec("Groove", Some("Center"), [0.0, 0.0, 0.9], [0.0, 0.0, 1.0]),
    ];
    bones.extend(humanoid(&Naming {
        hips: "LowerBody",
        hips_parent: Some("Center"),
        spine_parent: Some("Groove"),
        spines: &["UpperBody", "UpperBody2"],
        neck: "Neck",
        head: "Head",
        limbs: ["Shoulder_{}", "Arm_{}", "Elbow_{}", "Wrist_{}", "Leg_{}", "Knee_{}", "Ankle_{}"],
        sides: ["L", "R"],
    }));
    bones.push(spec("Eye_L", Some("Head"), [0.03, -0.05, 1.65], [0.03, -0.05, 1.68]));
    bones.push(spec("EyeHighlight_L", Some("Eye_L"), [0.03, -0.06, 1.65], [0.03, -0.06, 1.66]));
    bones
}

fn mmd_rig() -> Scene {
    build(&mmd_bones(), &["ParentNode", "Center", "Groove"])
}

fn source_engine_rig() -> Scene {
    let mut scene = build(
        &humanoid(&Naming {
            hips: "ValveBiped.Bip01_Pelvis",
            hips_parent: None,
            spine_parent: None,
            spines: &[
                "ValveBiped.Bip01_Spine",
                "ValveBiped.Bip01_Spine1",
                "ValveBiped.Bip01_Spine2",
                "ValveBiped.Bip01_Spine4",
            ],
            neck: "ValveBiped.Bip01_Neck1",
            head: "ValveBiped.Bip01_Head1",
            limbs: [
                "ValveBiped.Bip01_{}_Clavicle",
                "ValveBiped.Bip01_{}_UpperArm",
                "ValveBiped.Bip01_{}_Forearm",
                "ValveBiped.Bip01_{}_Hand",
                "ValveBiped.Bip01_{}_Thigh",
                "ValveBiped.Bip01_{}_Calf",
                "ValveBiped.Bip01_{}_Foot",
            ],
            sides: ["L", "R"],
        }),
        &[],
    );
    scene.meshes.push(Mesh::new("Body_lod1"));
    scene.meshes.push(Mesh::new("VTA vertices"));
    scene.armature.animation_action = Some("ragdoll".to_string());
    scene
}

fn mixamo_rig() -> Scene {
    let mut bones = humanoid(&Naming {
        hips: "mixamorig:Hips",
        hips_parent: None,
        spine_parent: None,
        spines: &["mixamorig:Spine", "mixamorig:Spine1", "mixamorig:Spine2"],
        neck: "mixamorig:Neck",
        head: "mixamorig:Head",
        limbs: [
            "mixamorig:{}Shoulder",
            "mixamorig:{}Arm",
            "mixamorig:{}ForeArm",
            "mixamorig:{}Hand",
            "mixamorig:{}UpLeg",
            "mixamorig:{}Leg",
            "mixamorig:{}Foot",
        ],
        sides: ["Left", "Right"],
    });
    bones[0].head = [0.0, 0.05, 1.0];
    bones.push(spec(
        "mixamorig:HeadTop_End",
        Some("mixamorig:Head"),
        [0.0, 0.0, 1.75],
        [0.0, 0.0, 1.85],
    ));
    build(&bones, &[])
}

fn daz_rig() -> Scene {
    let mut scene = build(
        &humanoid(&Naming {
            hips: "hip",
            hips_parent: None,
            spine_parent: None,
            spines: &["abdomenLower", "abdomenUpper", "chestLower", "chestUpper"],
            neck: "neckLower",
            head: "head",
            limbs: [
                "{}Collar",
                "{}ShldrBend",
                "{}ForearmBend",
                "{}Hand",
                "{}ThighBend",
                "{}Shin",
                "{}Foot",
            ],
            sides: ["l", "r"],
        }),
        &[],
    );
    // Centimetre positions under a 0.01 object scale.
    for id in scene.armature.ids() {
        if let Some(bone) = scene.armature.bone_mut(id) {
            bone.head *= 100.0;
            bone.tail *= 100.0;
        }
    }
    for vertex in &mut scene.meshes[0].vertices {
        *vertex *= 100.0;
    }
    scene.armature.matrix_world = Matrix4::new_scaling(0.01);
    scene.armature.animation_action = Some("Pose".to_string());
    scene
}

fn vrm_rig() -> Scene {
    let mut bones = vec![spec("Root", None, [0.0; 3], [0.0, 0.0, 0.1])];
    bones.extend(humanoid(&Naming {
        hips: "J_Bip_C_Hips",
        hips_parent: Some("Root"),
        spine_parent: None,
        spines: &["J_Bip_C_Spine", "J_Bip_C_Chest", "J_Bip_C_UpperChest"],
        neck: "J_Bip_C_Neck",
        head: "J_Bip_C_Head",
        limbs: [
            "J_Bip_{}_Shoulder",
            "J_Bip_{}_UpperArm",
            "J_Bip_{}_LowerArm",
            "J_Bip_{}_Hand",
            "J_Bip_{}_UpperLeg",
            "J_Bip_{}_LowerLeg",
            "J_Bip_{}_Foot",
        ],
        sides: ["L", "R"],
    }));
    bones.push(spec("J_Sec_Hair1_01", Some("J_Bip_C_Head"), [0.0, 0.1, 1.7], [0.0, 0.15, 1.6]));
    build(&bones, &["Root"])
}

// ─── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn given_mmd_rig_when_fixing_then_control_bones_are_removed_and_chains_are_parented() {
    let mut scene = mmd_rig();
    scene.meshes.push(Mesh::new("rigidbodies"));
    let options = FixOptions {
        join_meshes: false,
        ..strict()
    };
    let mut sink = MemorySink::default();

    let report = fixed(fix_armature(&mut scene, &options, &mut sink));

    assert_eq!(report.spine_case, SpineCase::Rename2);
    assert_eq!(report.removed_bones, vec!["Center".to_string(), "Groove".to_string()]);
    assert!(report.removed_zero_weight.contains(&"ParentNode".to_string()));
    assert!(scene.mesh("rigidbodies").is_none());
    assert_canonical_limbs(&scene);
    assert_single_rooted_tree(&scene);
    assert_eq!(parent_of(&scene, "Spine").as_deref(), Some("Hips"));
    assert_eq!(parent_of(&scene, "Left shoulder").as_deref(), Some("Chest"));

    assert!(!scene.armature.contains("EyeHighlight_L"));
    let eye = scene.meshes[0].group("Eye_L").expect("eye group");
    assert_eq!(eye.weights.len(), 2);
    assert!(sink.progress_finished);
}

#[test]
fn given_weighted_control_bones_when_fixing_then_their_weight_survives_in_kept_bones() {
    let mut bones = mmd_bones();
    bones.push(spec("ShoulderP_L", Some("UpperBody2"), [0.05, 0.0, 1.4], [0.05, 0.0, 1.42]));
    let mut scene = build(&bones, &["ParentNode"]);
    let before = total_weight(&scene);

    let report = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));

    assert!((total_weight(&scene) - before).abs() < 1e-5);
    assert_eq!(
        report.removed_bones,
        vec!["Center".to_string(), "Groove".to_string(), "ShoulderP_L".to_string()]
    );
    let body = &scene.meshes[0];
    assert!(!body.has_group("Center"));
    assert!(!body.has_group("ShoulderP_L"));
    assert_eq!(body.group("ParentNode").map(|g| g.weights.len()), Some(2));
    assert_eq!(body.group("Chest").map(|g| g.weights.len()), Some(2));
    assert!(!report.removed_zero_weight.contains(&"ParentNode".to_string()));
    assert_eq!(parent_of(&scene, "ParentNode").as_deref(), Some("Hips"));
    assert_single_rooted_tree(&scene);
}

#[test]
fn given_source_engine_rig_when_fixing_then_extra_spines_merge_and_weight_is_conserved() {
    let mut scene = source_engine_rig();
    let before = total_weight(&scene);

    let report = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));

    assert!(report.vendor.source_engine);
    assert_eq!(report.spine_case, SpineCase::SourceEngine4);
    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].name, "Body");
    assert_eq!(scene.armature.animation_action, None);

    assert!(!scene.armature.contains("Bip_Spine1"));
    assert!(!scene.armature.contains("Bip_Spine4"));
    let body = &scene.meshes[0];
    assert_eq!(body.group("Spine").map(|g| g.weights.len()), Some(2));
    assert_eq!(body.group("Chest").map(|g| g.weights.len()), Some(2));
    assert!((total_weight(&scene) - before).abs() < 1e-5);

    let spine = scene.armature.find("Spine").expect("spine");
    let chest = scene.armature.find("Chest").expect("chest");
    assert_eq!(
        scene.armature.bone(spine).map(|b| b.tail),
        scene.armature.bone(chest).map(|b| b.head)
    );
    assert_eq!(parent_of(&scene, "Neck").as_deref(), Some("Chest"));
    assert_canonical_limbs(&scene);
    assert_single_rooted_tree(&scene);
}

#[test]
fn given_mixamo_rig_when_fixing_then_namespaces_are_dropped_and_hips_stay_put() {
    let mut scene = mixamo_rig();

    let report = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));

    assert!(report.vendor.mixamo);
    assert_eq!(report.spine_case, SpineCase::MergeN);
    assert!(!scene.armature.contains("Spine1"));
    assert!(!scene.armature.contains("HeadTop_End"));
    assert_eq!(scene.meshes[0].group("Head").map(|g| g.weights.len()), Some(2));

    let hips = scene.armature.find("Hips").expect("hips");
    let head = scene.armature.bone(hips).expect("hips bone").head;
    assert_eq!(head, Vector3::new(0.0, 0.05, 1.0));
    assert_canonical_limbs(&scene);
    assert_single_rooted_tree(&scene);
}

#[test]
fn given_daz_rig_when_fixing_then_scale_is_applied_and_abdomen_bones_merge() {
    let mut scene = daz_rig();

    let report = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));

    assert!(report.vendor.daz);
    assert_eq!(report.spine_case, SpineCase::MergeN);
    assert_eq!(scene.armature.matrix_world, Matrix4::identity());
    assert_eq!(scene.armature.animation_action, None);

    let head = scene.armature.find("Head").expect("head");
    let head_z = scene.armature.bone(head).expect("head bone").head.z;
    assert!((head_z - 1.55).abs() < 1e-4);
    let top = scene.meshes[0]
        .vertices
        .iter()
        .map(|vertex| vertex.z)
        .fold(f32::MIN, f32::max);
    assert!((top - 1.55).abs() < 1e-4);

    for merged in ["AbdomenUpper", "ChestLower"] {
        assert!(!scene.armature.contains(merged), "{merged} kept");
    }
    assert_eq!(scene.meshes[0].group("Spine").map(|g| g.weights.len()), Some(3));
    assert_canonical_limbs(&scene);
    assert_single_rooted_tree(&scene);
}

#[test]
fn given_vrm_rig_when_fixing_twice_then_second_run_changes_nothing() {
    let mut scene = vrm_rig();

    let first = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));
    let names: BTreeSet<String> = scene.armature.names().into_iter().collect();
    let second = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));

    assert_eq!(first.spine_case, SpineCase::MergeN);
    assert_eq!(second.spine_case, SpineCase::Rename2);
    assert!(!names.contains("Root"));
    assert!(names.contains("J_Sec_Hair1_01"));
    assert_eq!(scene.armature.names().into_iter().collect::<BTreeSet<_>>(), names);
    assert_eq!(parent_of(&scene, "J_Sec_Hair1_01").as_deref(), Some("Head"));
    assert_single_rooted_tree(&scene);
}

#[test]
fn given_single_spine_bone_when_fixing_then_chest_is_inserted_above_it() {
    let mut scene = build(
        &humanoid(&Naming {
            hips: "Hips",
            hips_parent: None,
            spine_parent: None,
            spines: &["UpperBody"],
            neck: "Neck",
            head: "Head",
            limbs: ["Shoulder_{}", "Arm_{}", "Elbow_{}", "Wrist_{}", "Leg_{}", "Knee_{}", "Ankle_{}"],
            sides: ["L", "R"],
        }),
        &[],
    );

    let report = fixed(fix_armature(&mut scene, &strict(), &mut MemorySink::default()));

    assert_eq!(report.spine_case, SpineCase::Synthesize);
    assert_eq!(report.created_bones, vec!["Chest".to_string()]);
    assert_eq!(parent_of(&scene, "Chest").as_deref(), Some("Spine"));
    assert_eq!(parent_of(&scene, "Neck").as_deref(), Some("Chest"));
    assert_eq!(parent_of(&scene, "Right shoulder").as_deref(), Some("Chest"));
    let spine = scene.armature.find("Spine").expect("spine");
    let chest = scene.armature.find("Chest").expect("chest");
    let spine_tail = scene.armature.bone(spine).expect("spine bone").tail;
    let chest_head = scene.armature.bone(chest).expect("chest bone").head;
    assert!((spine_tail - chest_head).norm() < 1e-6);
    assert_single_rooted_tree(&scene);
}

#[test]
fn given_scene_file_when_fixed_through_documents_then_result_reloads_identically() {
    let dir = env::temp_dir();
    let input = dir.join(format!("rigfix-pipeline-in-{}.json", process::id()));
    let output = dir.join(format!("rigfix-pipeline-out-{}.json", process::id()));
    write_scene(&input, &vrm_rig()).expect("write input");

    let mut scene = read_scene(&input).expect("read input");
    let report = fixed(fix_armature(&mut scene, &FixOptions::default(), &mut MemorySink::default()));
    write_scene(&output, &scene).expect("write output");
    let reloaded = read_scene(&output).expect("read output");
    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&output);

    assert_eq!(reloaded.armature.name, "Armature");
    assert_eq!(reloaded.armature.names(), scene.armature.names());
    assert_eq!(report.bone_count, reloaded.armature.len());
    assert_eq!(reloaded.meshes[0].vertex_groups, scene.meshes[0].vertex_groups);
}
