//! Static bone naming data.
//!
//! Names on the right-hand side are compared case-insensitively against bone
//! names *after* string normalization, so they are written in normalized form
//! (underscores, capitalized segments, known prefixes already stripped).
//! `\Left`, `\left`, `\L` and `\l` are side placeholders.

/// Canonical name → known source aliases. The `Spine` aliases are listed from
/// the bottom of the torso upward; their order decides which spine candidate
/// becomes `Spine` and which becomes `Chest`.
pub(crate) const BONE_RENAME: &[(&str, &[&str])] = &[
    (
        "Hips",
        &[
            "Pelvis",
            "Hip",
            "LowerBody",
            "Bip_Pelvis",
            "B_Pelvis",
            "Root_Hips",
            "Mixamorig_Hips",
            "J_Bip_C_Hips",
            "Hip_Root",
        ],
    ),
    (
        "Spine",
        &[
            "Spine",
            "Bip_Spine",
            "Mixamorig_Spine",
            "J_Bip_C_Spine",
            "Abdomen",
            "AbdomenLower",
            "UpperBody",
            "Spine1",
            "Bip_Spine1",
            "Mixamorig_Spine1",
            "AbdomenUpper",
            "Abdomen2",
            "Spine2",
            "Bip_Spine2",
            "Mixamorig_Spine2",
            "UpperBody2",
            "Torso",
            "Spine3",
            "Bip_Spine3",
            "Chest",
            "J_Bip_C_Chest",
            "ChestLower",
            "Spine4",
            "Bip_Spine4",
            "UpperChest",
            "Upper_Chest",
            "J_Bip_C_UpperChest",
            "ChestUpper",
        ],
    ),
    (
        "Neck",
        &[
            "Neck1",
            "Bip_Neck",
            "Bip_Neck1",
            "Mixamorig_Neck",
            "J_Bip_C_Neck",
            "NeckLower",
            "Neck_01",
        ],
    ),
    (
        "Head",
        &[
            "Bip_Head",
            "Bip_Head1",
            "Mixamorig_Head",
            "J_Bip_C_Head",
            "Head_01",
        ],
    ),
    (
        "\\Left shoulder",
        &[
            "Shoulder_\\L",
            "\\L_Shoulder",
            "\\LShoulder",
            "\\LeftShoulder",
            "Clavicle_\\L",
            "\\L_Clavicle",
            "Bip_\\L_Clavicle",
            "Collarbone_\\L",
            "\\LCollar",
            "Mixamorig_\\LeftShoulder",
            "J_Bip_\\L_Shoulder",
        ],
    ),
    (
        "\\Left arm",
        &[
            "Arm_\\L",
            "\\L_Arm",
            "\\LArm",
            "\\LeftArm",
            "UpperArm_\\L",
            "\\L_UpperArm",
            "\\LeftUpperArm",
            "Bip_\\L_UpperArm",
            "Mixamorig_\\LeftArm",
            "J_Bip_\\L_UpperArm",
            "\\LShldr",
            "\\LShldrBend",
        ],
    ),
    (
        "\\Left elbow",
        &[
            "Elbow_\\L",
            "\\L_Elbow",
            "\\LElbow",
            "\\LeftForeArm",
            "Forearm_\\L",
            "\\L_Forearm",
            "LowerArm_\\L",
            "\\L_LowerArm",
            "\\LeftLowerArm",
            "Bip_\\L_Forearm",
            "Mixamorig_\\LeftForeArm",
            "J_Bip_\\L_LowerArm",
            "\\LForearmBend",
        ],
    ),
    (
        "\\Left wrist",
        &[
            "Wrist_\\L",
            "\\L_Wrist",
            "\\LeftHand",
            "Hand_\\L",
            "\\L_Hand",
            "\\LHand",
            "Bip_\\L_Hand",
            "Mixamorig_\\LeftHand",
            "J_Bip_\\L_Hand",
        ],
    ),
    (
        "\\Left leg",
        &[
            "Leg_\\L",
            "\\L_Leg",
            "\\LLeg",
            "\\LeftUpLeg",
            "Thigh_\\L",
            "\\L_Thigh",
            "UpperLeg_\\L",
            "\\L_UpperLeg",
            "\\LeftUpperLeg",
            "Bip_\\L_Thigh",
            "Mixamorig_\\LeftUpLeg",
            "J_Bip_\\L_UpperLeg",
            "\\LThigh",
            "\\LThighBend",
        ],
    ),
    (
        "\\Left knee",
        &[
            "Knee_\\L",
            "\\L_Knee",
            "\\LKnee",
            "\\LeftLeg",
            "Calf_\\L",
            "\\L_Calf",
            "Shin_\\L",
            "LowerLeg_\\L",
            "\\L_LowerLeg",
            "\\LeftLowerLeg",
            "Bip_\\L_Calf",
            "Mixamorig_\\LeftLeg",
            "J_Bip_\\L_LowerLeg",
            "\\LShin",
        ],
    ),
    (
        "\\Left ankle",
        &[
            "Ankle_\\L",
            "\\L_Ankle",
            "\\LAnkle",
            "\\LeftFoot",
            "Foot_\\L",
            "\\L_Foot",
            "\\LFoot",
            "Bip_\\L_Foot",
            "Mixamorig_\\LeftFoot",
            "J_Bip_\\L_Foot",
        ],
    ),
    (
        "\\Left toe",
        &[
            "Toe_\\L",
            "\\L_Toe",
            "Toes_\\L",
            "ToeBase_\\L",
            "\\LeftToeBase",
            "\\LToe",
            "Bip_\\L_Toe0",
            "Mixamorig_\\LeftToeBase",
            "J_Bip_\\L_ToeBase",
        ],
    ),
    (
        "Eye_\\L",
        &[
            "\\L_Eye",
            "\\LeftEye",
            "\\LEye",
            "Eye\\Left",
            "Eyeball_\\L",
            "Bip_\\L_Eye",
            "J_Adj_\\L_FaceEye",
        ],
    ),
];

/// Finger renames, merged into [`BONE_RENAME`] when the rule set is built.
pub(crate) const BONE_RENAME_FINGERS: &[(&str, &[&str])] = &[
    (
        "Thumb0_\\L",
        &["Bip_\\L_Finger0", "\\LeftHandThumb1", "J_Bip_\\L_Thumb1", "\\L_ThumbProximal", "\\LThumb1"],
    ),
    (
        "Thumb1_\\L",
        &["Bip_\\L_Finger01", "\\LeftHandThumb2", "J_Bip_\\L_Thumb2", "\\L_ThumbIntermediate", "\\LThumb2"],
    ),
    (
        "Thumb2_\\L",
        &["Bip_\\L_Finger02", "\\LeftHandThumb3", "J_Bip_\\L_Thumb3", "\\L_ThumbDistal", "\\LThumb3"],
    ),
    (
        "IndexFinger1_\\L",
        &["Bip_\\L_Finger1", "\\LeftHandIndex1", "J_Bip_\\L_Index1", "\\L_IndexProximal", "\\LIndex1"],
    ),
    (
        "IndexFinger2_\\L",
        &["Bip_\\L_Finger11", "\\LeftHandIndex2", "J_Bip_\\L_Index2", "\\L_IndexIntermediate", "\\LIndex2"],
    ),
    (
        "IndexFinger3_\\L",
        &["Bip_\\L_Finger12", "\\LeftHandIndex3", "J_Bip_\\L_Index3", "\\L_IndexDistal", "\\LIndex3"],
    ),
    (
        "MiddleFinger1_\\L",
        &["Bip_\\L_Finger2", "\\LeftHandMiddle1", "J_Bip_\\L_Middle1", "\\L_MiddleProximal", "\\LMid1"],
    ),
    (
        "MiddleFinger2_\\L",
        &["Bip_\\L_Finger21", "\\LeftHandMiddle2", "J_Bip_\\L_Middle2", "\\L_MiddleIntermediate", "\\LMid2"],
    ),
    (
        "MiddleFinger3_\\L",
        &["Bip_\\L_Finger22", "\\LeftHandMiddle3", "J_Bip_\\L_Middle3", "\\L_MiddleDistal", "\\LMid3"],
    ),
    (
        "RingFinger1_\\L",
        &["Bip_\\L_Finger3", "\\LeftHandRing1", "J_Bip_\\L_Ring1", "\\L_RingProximal", "\\LRing1"],
    ),
    (
        "RingFinger2_\\L",
        &["Bip_\\L_Finger31", "\\LeftHandRing2", "J_Bip_\\L_Ring2", "\\L_RingIntermediate", "\\LRing2"],
    ),
    (
        "RingFinger3_\\L",
        &["Bip_\\L_Finger32", "\\LeftHandRing3", "J_Bip_\\L_Ring3", "\\L_RingDistal", "\\LRing3"],
    ),
    (
        "LittleFinger1_\\L",
        &["Bip_\\L_Finger4", "\\LeftHandPinky1", "J_Bip_\\L_Little1", "\\L_LittleProximal", "\\LPinky1"],
    ),
    (
        "LittleFinger2_\\L",
        &["Bip_\\L_Finger41", "\\LeftHandPinky2", "J_Bip_\\L_Little2", "\\L_LittleIntermediate", "\\LPinky2"],
    ),
    (
        "LittleFinger3_\\L",
        &["Bip_\\L_Finger42", "\\LeftHandPinky3", "J_Bip_\\L_Little3", "\\L_LittleDistal", "\\LPinky3"],
    ),
];

/// Canonical name → bones whose weights always fold into it.
pub(crate) const BONE_REWEIGHT: &[(&str, &[&str])] = &[
    ("Hips", &["Waist", "Pelvis_Extra", "Hip_Extra"]),
    ("Chest", &["UpperBody3", "Chest_Extra", "Bust"]),
    (
        "Head",
        &["HeadTop", "Head_Top", "HeadTop_End", "Head_End", "Mixamorig_HeadTop_End"],
    ),
    ("\\Left shoulder", &["ShoulderC_\\L", "Clavicle_Extra_\\L"]),
    (
        "\\Left arm",
        &[
            "ArmTwist_\\L",
            "ArmTwist1_\\L",
            "ArmTwist2_\\L",
            "ArmTwist3_\\L",
            "UpperArm_Twist_\\L",
            "Bip_\\L_UpperArmTwist",
            "\\LShldrTwist",
        ],
    ),
    (
        "\\Left elbow",
        &[
            "HandTwist_\\L",
            "HandTwist1_\\L",
            "HandTwist2_\\L",
            "HandTwist3_\\L",
            "LowerArm_Twist_\\L",
            "Bip_\\L_ForearmTwist",
            "\\LForearmTwist",
        ],
    ),
    ("\\Left wrist", &["Wrist_Twist_\\L", "Hand_Extra_\\L"]),
    (
        "\\Left leg",
        &["LegD_\\L", "Thigh_Twist_\\L", "Bip_\\L_ThighTwist", "\\LThighTwist"],
    ),
    ("\\Left knee", &["KneeD_\\L", "Knee_Twist_\\L"]),
    ("\\Left ankle", &["AnkleD_\\L", "Foot_Twist_\\L"]),
    (
        "\\Left toe",
        &["ToeTip_\\L", "ToeEX_\\L", "Toe_End_\\L", "\\LeftToe_End"],
    ),
];

/// Helper bones whose weights go to the nearest ancestor that is not itself
/// on this list.
pub(crate) const BONE_REWEIGHT_TO_PARENT: &[&str] = &[
    "Bip_\\L_Trapezius",
    "Bip_\\L_Shoulder",
    "Bip_\\L_Bicep",
    "Bip_\\L_Elbow",
    "Bip_\\L_Ulna",
    "Bip_\\L_Wrist",
    "Bip_\\L_Knee",
    "Elbow_Aux_\\L",
    "Knee_Aux_\\L",
];

/// Bones removed outright (their weights go to their parent).
pub(crate) const BONE_DELETE: &[&str] = &[
    "ControlNode",
    "ParentNode",
    "Center",
    "CenterTip",
    "Groove",
    "GrooveTip",
    "LowerBody2",
    "LowerBodyTip",
    "UpperBody2Tip",
    "Eyes",
    "EyesTip",
    "NeckTip",
];

/// Name prefixes of bones removed outright.
pub(crate) const BONE_DELETE_PREFIXES: &[&str] = &[
    "Shadow_",
    "Dummy_",
    "WaistCancel",
    "LegIK",
    "ToeTipIK",
    "ShoulderP_",
    "EyeTip_",
    "ThumbTip_",
    "IndexFingerTip_",
    "MiddleFingerTip_",
    "RingFingerTip_",
    "LittleFingerTip_",
    "HandDummy_",
    "HandTip_",
    "SleeveShoulderIK_",
];

/// Bones that are never deleted and whose vertex groups may be created on
/// demand during weight merging.
pub(crate) const DONT_DELETE_THESE_BONES: &[&str] = &[
    "Hips",
    "Spine",
    "Chest",
    "Neck",
    "Head",
    "\\Left shoulder",
    "\\Left arm",
    "\\Left elbow",
    "\\Left wrist",
    "\\Left leg",
    "\\Left knee",
    "\\Left ankle",
    "\\Left toe",
    "\\Left leg 2",
    "Eye_\\L",
    "Thumb0_\\L",
    "Thumb1_\\L",
    "Thumb2_\\L",
    "IndexFinger1_\\L",
    "IndexFinger2_\\L",
    "IndexFinger3_\\L",
    "MiddleFinger1_\\L",
    "MiddleFinger2_\\L",
    "MiddleFinger3_\\L",
    "RingFinger1_\\L",
    "RingFinger2_\\L",
    "RingFinger3_\\L",
    "LittleFinger1_\\L",
    "LittleFinger2_\\L",
    "LittleFinger3_\\L",
];

/// Canonical child → canonical parent.
pub(crate) const BONE_PARENTING: &[(&str, &str)] = &[
    ("Spine", "Hips"),
    ("Chest", "Spine"),
    ("Neck", "Chest"),
    ("Head", "Neck"),
    ("\\Left shoulder", "Chest"),
    ("\\Left arm", "\\Left shoulder"),
    ("\\Left elbow", "\\Left arm"),
    ("\\Left wrist", "\\Left elbow"),
    ("\\Left leg", "Hips"),
    ("\\Left knee", "\\Left leg"),
    ("\\Left ankle", "\\Left knee"),
    ("\\Left toe", "\\Left ankle"),
    ("Eye_\\L", "Head"),
];

/// `(required siblings, ambiguous name, resolved name)`.
pub(crate) const BONE_CONFLICTING_NAMES: &[(&[&str], &str, &str)] = &[
    (&["UpperLeg_\\L", "Foot_\\L"], "Leg_\\L", "LowerLeg_\\L"),
    (&["UpperArm_\\L", "Hand_\\L"], "Arm_\\L", "LowerArm_\\L"),
    (&["Head", "HeadTop"], "Head_End", "HeadTop_End"),
];

/// Anchor name without a side → canonical suffix used once the side is known.
pub(crate) const BONE_RENAME_UNKNOWN_SIDE: &[(&str, &str)] = &[
    ("Shoulder", "shoulder"),
    ("Arm", "arm"),
    ("Elbow", "elbow"),
    ("Forearm", "elbow"),
    ("Wrist", "wrist"),
    ("Hand", "wrist"),
    ("Leg", "leg"),
    ("Thigh", "leg"),
    ("Knee", "knee"),
    ("Ankle", "ankle"),
    ("Foot", "ankle"),
    ("Toe", "toe"),
];

/// Head-of-name replacements, applied in table order.
pub(crate) const NAME_PREFIXES: &[(&str, &str)] = &[
    ("_", ""),
    ("ValveBiped_", ""),
    ("Valvebiped_", ""),
    ("Bip1_", "Bip_"),
    ("Bip01_", "Bip_"),
    ("Bip001_", "Bip_"),
    ("Character1_", ""),
    ("HLP_", ""),
    ("JD_", ""),
    ("JU_", ""),
    ("Armature|", ""),
    ("Bone_", ""),
    ("C_", ""),
    ("Cf_S_", ""),
    ("Cf_J_", ""),
    ("G_", ""),
    ("Joint_", ""),
];

/// Required chains checked after a run.
pub(crate) const REQUIRED_HIERARCHY: &[&[&str]] = &[
    &["Hips", "Spine", "Chest", "Neck", "Head"],
    &["Hips", "Left leg", "Left knee", "Left ankle"],
    &["Hips", "Right leg", "Right knee", "Right ankle"],
    &["Chest", "Left shoulder", "Left arm", "Left elbow", "Left wrist"],
    &["Chest", "Right shoulder", "Right arm", "Right elbow", "Right wrist"],
];
