use super::progress::Progress;
use crate::{
    rules::{RuleSet, name_prefixes},
    scene::{BoneId, Scene},
};

/// Spine-alias bones collected while renaming, split by whether they have
/// children. They keep their names until the spine case is decided.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct SpineCandidates {
    pub spines: Vec<BoneId>,
    pub parts: Vec<BoneId>,
}

// ─── String normalization ─────────────────────────────────────────────────────

/// Canonicalize one bone name.
///
/// Separators become underscores, every segment starts upper-case, known
/// exporter prefixes are rewritten, a leading numeric segment is dropped,
/// quoted and namespaced names keep their meaningful part and a trailing
/// `S0` or `_Jnt` is removed. Returns the input unchanged when nothing would
/// remain.
///
/// Passes repeat until the name settles, so stacked prefixes such as
/// `G_C_Hips` and normalized output are stable.
pub fn normalize_name(name: &str) -> String {
    let mut result = name.to_string();
    for _ in 0..=name.len() {
        let next = normalize_pass(&result);
        if next == result {
            break;
        }
        result = next;
    }
    result
}

fn normalize_pass(name: &str) -> String {
    let mut result = collapse_underscores(&name.replace([' ', '-', '.'], "_"));
    result = capitalize_segments(&result);

    for (prefix, replacement) in name_prefixes() {
        if let Some(rest) = result.strip_prefix(*prefix) {
            result = format!("{replacement}{rest}");
        }
    }

    if let Some((first, rest)) = result.split_once('_')
        && !first.is_empty()
        && first.chars().all(|c| c.is_ascii_digit())
    {
        result = rest.to_string();
    }

    let quoted: Vec<&str> = result.split('"').collect();
    if quoted.len() > 3 {
        result = quoted[1].to_string();
    }
    if let Some((_, rest)) = result.split_once(':') {
        result = rest.replace(':', "");
    }

    if let Some(stripped) = result.strip_suffix("S0") {
        result = stripped.to_string();
    } else if let Some(stripped) = result.strip_suffix("_Jnt") {
        result = stripped.to_string();
    }

    // Namespaces and quotes may expose a lower-case start again.
    let result = capitalize_segments(&result);
    if result.is_empty() {
        name.to_string()
    } else {
        result
    }
}

fn collapse_underscores(name: &str) -> String {
    let mut result = name.to_string();
    while result.contains("__") {
        for run in ["____", "___", "__"] {
            result = result.replace(run, "_");
        }
    }
    result
}

fn capitalize_segments(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("_")
}

// ─── Armature passes ──────────────────────────────────────────────────────────

/// Normalize every bone name in creation order. Collisions receive a numeric
/// suffix.
pub(super) fn standardize_names(scene: &mut Scene, progress: &mut Progress) {
    for id in scene.armature.ids() {
        progress.step();
        let Some(current) = scene.armature.name(id) else {
            continue;
        };
        let normalized = normalize_name(current);
        if normalized != current {
            scene.rename_bone(id, &normalized);
        }
    }
}

/// Apply conflicting-name rules, then turn any period left in a name into an
/// underscore.
pub(super) fn resolve_conflicts(scene: &mut Scene, rules: &RuleSet) -> Vec<(String, String)> {
    let mut renamed = Vec::new();
    for rule in &rules.conflicts {
        let armature = &scene.armature;
        let Some(id) = armature.find_ci(&rule.ambiguous) else {
            continue;
        };
        if !rule
            .required
            .iter()
            .all(|name| armature.find_ci(name).is_some())
        {
            continue;
        }
        if let Some(old) = armature.name(id).map(ToOwned::to_owned)
            && let Some(new) = scene.rename_bone(id, &rule.resolved)
        {
            log::debug!("resolved conflicting name '{old}' to '{new}'");
            renamed.push((old, new));
        }
    }

    for id in scene.armature.ids() {
        if let Some(name) = scene.armature.name(id)
            && name.contains('.')
        {
            let replaced = name.replace('.', "_");
            scene.rename_bone(id, &replaced);
        }
    }
    renamed
}

/// Rename every alias bone to its canonical name.
///
/// `Spine` aliases are only collected. A rename is skipped when the canonical
/// name is already taken, so each canonical bone keeps the first match.
pub(super) fn apply_renames(
    scene: &mut Scene,
    rules: &RuleSet,
    progress: &mut Progress,
) -> (Vec<(String, String)>, SpineCandidates) {
    let mut renamed = Vec::new();
    let mut candidates = SpineCandidates::default();

    for rule in &rules.renames {
        for alias in &rule.aliases {
            progress.step();
            let Some(id) = scene.armature.find_ci(alias) else {
                continue;
            };

            if rule.canonical == "Spine" {
                if candidates.spines.contains(&id) || candidates.parts.contains(&id) {
                    continue;
                }
                if scene.armature.children(id).is_empty() {
                    candidates.parts.push(id);
                } else {
                    candidates.spines.push(id);
                }
                continue;
            }

            if scene.armature.contains(&rule.canonical) {
                continue;
            }
            if let Some(old) = scene.armature.name(id).map(ToOwned::to_owned)
                && let Some(new) = scene.rename_bone(id, &rule.canonical)
            {
                renamed.push((old, new));
            }
        }
    }
    (renamed, candidates)
}

/// Give a side to anchor bones such as `Arm` or `thigh` from a child or
/// grandchild whose name mentions `left` or `right`.
pub(super) fn infer_unknown_sides(scene: &mut Scene, rules: &RuleSet) -> Vec<(String, String)> {
    let mut renamed = Vec::new();
    for rule in &rules.unknown_side {
        for id in scene.armature.ids() {
            let armature = &scene.armature;
            let Some(child_name) = armature.name(id).map(str::to_lowercase) else {
                continue;
            };
            let side = if child_name.contains("right") {
                Some("Right")
            } else if child_name.contains("left") {
                Some("Left")
            } else {
                None
            };

            let parent = armature.parent(id);
            let grandparent = parent.and_then(|parent| armature.parent(parent));
            let anchor = [parent, grandparent].into_iter().flatten().find(|ancestor| {
                armature
                    .name(*ancestor)
                    .is_some_and(|name| rule.matches(name))
            });

            if let (Some(anchor), Some(side)) = (anchor, side)
                && let Some(old) = armature.name(anchor).map(ToOwned::to_owned)
                && let Some(new) = scene.rename_bone(anchor, &format!("{side} {}", rule.suffix))
            {
                renamed.push((old, new));
                break;
            }
        }
    }
    renamed
}
