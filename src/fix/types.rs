use serde::{Deserialize, Serialize};

// ─── Options ──────────────────────────────────────────────────────────────────

/// Switches accepted by [`super::fix_armature`], shared by the CLI and the
/// persisted settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixOptions {
    /// Build the extra hip and leg bones needed by external trackers.
    pub full_body_tracking: bool,
    /// Merge every skinned mesh into the first one.
    pub join_meshes: bool,
    /// Collapse duplicate material slots.
    pub combine_materials: bool,
    /// Delete bones and vertex groups that carry no weight.
    pub remove_zero_weight: bool,
    /// Keep single-child end bones during zero-weight removal.
    pub keep_end_bones: bool,
    /// Point each single-child bone's tail at its child.
    pub connect_bones: bool,
    /// Also check parent links of the required chains, not only existence.
    pub check_parenting: bool,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            full_body_tracking: false,
            join_meshes: true,
            combine_materials: true,
            remove_zero_weight: true,
            keep_end_bones: false,
            connect_bones: true,
            check_parenting: false,
        }
    }
}

// ─── Classification ───────────────────────────────────────────────────────────

/// Source conventions detected on the input rig. Flags are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorFlags {
    pub source_engine: bool,
    pub daz: bool,
    pub mixamo: bool,
    pub full_body_tracking: bool,
}

/// Armature-space axis indices. `x` is lateral, `y` is depth and `z` is
/// vertical; `fbx` is set when the rig was exported Y-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneAxes {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub fbx: bool,
}

impl Default for BoneAxes {
    fn default() -> Self {
        Self {
            x: 0,
            y: 1,
            z: 2,
            fbx: false,
        }
    }
}

/// How the spine candidates found while renaming are turned into
/// `Spine` and `Chest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpineCase {
    #[default]
    None,
    /// A single leaf spine part becomes `Spine`.
    LeafOnly,
    /// One candidate: a `Chest` is created above it.
    Synthesize,
    /// Two candidates: renamed to `Spine` and `Chest`.
    Rename2,
    /// Four source-engine candidates: every other one is merged.
    SourceEngine4,
    /// Three or more candidates: first and last survive, the rest merge into
    /// `Spine`.
    MergeN,
}

// ─── Reporting ────────────────────────────────────────────────────────────────

/// Severity level used by validation issues.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single issue produced while fixing or validating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// One vertex group merged into another on one mesh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightMerge {
    pub mesh: String,
    pub from: String,
    pub to: String,
    pub weight: f32,
}

/// Everything a run changed, returned with successful outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FixReport {
    pub vendor: VendorFlags,
    pub axes: BoneAxes,
    pub spine_case: SpineCase,
    /// `(old, new)` name pairs from the rename tables and spine handling.
    pub renamed_bones: Vec<(String, String)>,
    pub created_bones: Vec<String>,
    pub removed_bones: Vec<String>,
    pub merges: Vec<WeightMerge>,
    pub reparented: usize,
    pub repaired_uv_coordinates: usize,
    pub removed_zero_weight: Vec<String>,
    pub bone_count: usize,
    pub mesh_count: usize,
    pub issues: Vec<ValidationIssue>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum FixOutcome {
    /// The scene was normalized.
    Fixed(FixReport),
    /// Required bones were missing or misparented; the scene was restored.
    ValidationFailed { message: String },
    /// The scene was normalized but some data had to be repaired.
    Warning { message: String, report: FixReport },
}

impl FixOutcome {
    pub fn report(&self) -> Option<&FixReport> {
        match self {
            FixOutcome::Fixed(report) | FixOutcome::Warning { report, .. } => Some(report),
            FixOutcome::ValidationFailed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, FixOutcome::ValidationFailed { .. })
    }
}
