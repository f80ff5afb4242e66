use thiserror::Error;

use super::types::{Severity, ValidationIssue};
use crate::scene::Armature;

/// Why a fixed armature was rejected. `message` is the user-facing report.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct HierarchyError {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

/// Check that every bone of every chain exists and, when `check_parenting`
/// is set, that each bone is parented to the one before it.
///
/// All missing bones are collected before failing; parenting is only
/// inspected once nothing is missing, and the first bad link fails.
pub(super) fn validate_hierarchy(
    armature: &Armature,
    chains: &[Vec<String>],
    check_parenting: bool,
) -> Result<(), HierarchyError> {
    let mut missing: Vec<&str> = Vec::new();
    let mut lines = vec!["The following bones were not found:".to_string(), String::new()];
    for chain in chains {
        let absent: Vec<&str> = chain
            .iter()
            .map(String::as_str)
            .filter(|name| !armature.contains(name))
            .filter(|name| !missing.contains(name))
            .collect();
        if absent.is_empty() {
            continue;
        }
        lines.push(format!(" - {}", absent.join(", ")));
        missing.extend(absent);
    }

    if !missing.is_empty() {
        return Err(HierarchyError {
            message: lines.join("\n"),
            issues: missing
                .iter()
                .map(|name| {
                    ValidationIssue::new(
                        Severity::Error,
                        "MISSING_REQUIRED_BONE",
                        format!("Required bone '{name}' was not found"),
                    )
                })
                .collect(),
        });
    }

    if !check_parenting {
        return Ok(());
    }

    for chain in chains {
        for pair in chain.windows(2) {
            let [previous, name] = pair else {
                continue;
            };
            let Some(id) = armature.find(name) else {
                continue;
            };
            let message = match armature.parent(id).and_then(|parent| armature.name(parent)) {
                None => format!("{name} is not parented at all, this will cause problems!"),
                Some(parent) if parent != previous.as_str() => {
                    format!("{name} is not parented to {previous}, this will cause problems!")
                }
                Some(_) => continue,
            };
            return Err(HierarchyError {
                issues: vec![ValidationIssue::new(
                    Severity::Error,
                    "INVALID_BONE_HIERARCHY",
                    message.clone(),
                )],
                message,
            });
        }
    }
    Ok(())
}
