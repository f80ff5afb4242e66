//! Typed, side-expanded bone naming rules.
//!
//! The raw tables in [`tables`] are expanded once into a [`RuleSet`] that the
//! pipeline reads for the whole process lifetime.

pub mod side;
mod tables;

use std::{collections::HashSet, sync::OnceLock};

pub use side::{Side, SideExpand, expand_all, has_side_placeholder, resolve_side};

use crate::{fix::normalize_name, scene::names_match};

// ─── Rule records ─────────────────────────────────────────────────────────────

/// Canonical name with the source names that should be renamed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    pub canonical: String,
    pub aliases: Vec<String>,
}

impl SideExpand for RenameRule {
    fn has_side(&self) -> bool {
        has_side_placeholder(&self.canonical)
            || self.aliases.iter().any(|alias| has_side_placeholder(alias))
    }

    fn for_side(&self, side: Side) -> Self {
        Self {
            canonical: resolve_side(&self.canonical, side),
            aliases: self
                .aliases
                .iter()
                .map(|alias| resolve_side(alias, side))
                .collect(),
        }
    }
}

/// Destination bone with the bones whose weights are folded into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReweightRule {
    pub target: String,
    pub sources: Vec<String>,
}

impl SideExpand for ReweightRule {
    fn has_side(&self) -> bool {
        has_side_placeholder(&self.target)
            || self.sources.iter().any(|source| has_side_placeholder(source))
    }

    fn for_side(&self, side: Side) -> Self {
        Self {
            target: resolve_side(&self.target, side),
            sources: self
                .sources
                .iter()
                .map(|source| resolve_side(source, side))
                .collect(),
        }
    }
}

/// Rename `ambiguous` to `resolved` only when all `required` bones exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRule {
    pub required: Vec<String>,
    pub ambiguous: String,
    pub resolved: String,
}

impl SideExpand for ConflictRule {
    fn has_side(&self) -> bool {
        has_side_placeholder(&self.ambiguous)
            || has_side_placeholder(&self.resolved)
            || self.required.iter().any(|name| has_side_placeholder(name))
    }

    fn for_side(&self, side: Side) -> Self {
        Self {
            required: self
                .required
                .iter()
                .map(|name| resolve_side(name, side))
                .collect(),
            ambiguous: resolve_side(&self.ambiguous, side),
            resolved: resolve_side(&self.resolved, side),
        }
    }
}

/// A parent named `anchor` (or its lowercase form) becomes `Left <suffix>` or
/// `Right <suffix>` once a child reveals the side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSideRule {
    pub anchor: String,
    pub suffix: String,
}

impl UnknownSideRule {
    pub fn matches(&self, name: &str) -> bool {
        name == self.anchor || name == self.anchor.to_lowercase()
    }
}

// ─── Rule set ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Body renames followed by finger renames.
    pub renames: Vec<RenameRule>,
    /// Static reweights plus every non-`Spine` rename alias, so a leftover
    /// alias bone that could not be renamed still hands over its weights.
    pub reweights: Vec<ReweightRule>,
    pub reweight_to_parent: Vec<String>,
    pub delete: Vec<String>,
    pub delete_prefixes: Vec<String>,
    pub protected: Vec<String>,
    /// `(child, parent)` pairs of the canonical skeleton.
    pub parenting: Vec<(String, String)>,
    pub conflicts: Vec<ConflictRule>,
    pub unknown_side: Vec<UnknownSideRule>,
    pub required_chains: Vec<Vec<String>>,
}

impl RuleSet {
    /// Process-wide rule set built from the static tables on first use.
    pub fn standard() -> &'static RuleSet {
        static RULES: OnceLock<RuleSet> = OnceLock::new();
        RULES.get_or_init(|| {
            let rules = RuleSet::build();
            for (canonical, alias) in rules.duplicate_aliases() {
                log::debug!("duplicate rename alias '{alias}' under '{canonical}'");
            }
            rules
        })
    }

    fn build() -> Self {
        let renames: Vec<RenameRule> = tables::BONE_RENAME
            .iter()
            .chain(tables::BONE_RENAME_FINGERS)
            .map(|(canonical, aliases)| RenameRule {
                canonical: (*canonical).to_string(),
                aliases: aliases.iter().map(|alias| (*alias).to_string()).collect(),
            })
            .flat_map(SideExpand::expand)
            .map(with_normalized_alias)
            .collect();

        let mut reweights: Vec<ReweightRule> = tables::BONE_REWEIGHT
            .iter()
            .map(|(target, sources)| ReweightRule {
                target: (*target).to_string(),
                sources: sources.iter().map(|source| (*source).to_string()).collect(),
            })
            .flat_map(SideExpand::expand)
            .collect();
        for rule in renames.iter().filter(|rule| rule.canonical != "Spine") {
            match reweights.iter_mut().find(|r| r.target == rule.canonical) {
                Some(existing) => {
                    for alias in &rule.aliases {
                        if !existing.sources.contains(alias) {
                            existing.sources.push(alias.clone());
                        }
                    }
                }
                None => reweights.push(ReweightRule {
                    target: rule.canonical.clone(),
                    sources: rule.aliases.clone(),
                }),
            }
        }

        let parenting = tables::BONE_PARENTING
            .iter()
            .flat_map(|(child, parent)| {
                if has_side_placeholder(child) || has_side_placeholder(parent) {
                    Side::BOTH
                        .iter()
                        .map(|side| (resolve_side(child, *side), resolve_side(parent, *side)))
                        .collect::<Vec<_>>()
                } else {
                    vec![((*child).to_string(), (*parent).to_string())]
                }
            })
            .collect();

        let conflicts = tables::BONE_CONFLICTING_NAMES
            .iter()
            .map(|(required, ambiguous, resolved)| ConflictRule {
                required: required.iter().map(|name| (*name).to_string()).collect(),
                ambiguous: (*ambiguous).to_string(),
                resolved: (*resolved).to_string(),
            })
            .flat_map(SideExpand::expand)
            .collect();

        Self {
            renames,
            reweights,
            reweight_to_parent: expand_all(tables::BONE_REWEIGHT_TO_PARENT.iter().copied()),
            delete: expand_all(tables::BONE_DELETE.iter().copied()),
            delete_prefixes: tables::BONE_DELETE_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_string())
                .collect(),
            protected: expand_all(tables::DONT_DELETE_THESE_BONES.iter().copied()),
            parenting,
            conflicts,
            unknown_side: tables::BONE_RENAME_UNKNOWN_SIDE
                .iter()
                .map(|(anchor, suffix)| UnknownSideRule {
                    anchor: (*anchor).to_string(),
                    suffix: (*suffix).to_string(),
                })
                .collect(),
            required_chains: tables::REQUIRED_HIERARCHY
                .iter()
                .map(|chain| chain.iter().map(|name| (*name).to_string()).collect())
                .collect(),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.iter().any(|protected| protected == name)
    }

    /// Bones removed by the deletion pass, matched on their exact name.
    pub fn is_deletable(&self, name: &str) -> bool {
        self.delete.iter().any(|entry| entry == name)
            || self
                .delete_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    pub fn is_reweight_to_parent(&self, name: &str) -> bool {
        self.reweight_to_parent.iter().any(|entry| entry == name)
    }

    /// Rename aliases that already appeared, case-insensitively, under an
    /// earlier (or the same) canonical name.
    pub fn duplicate_aliases(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for rule in &self.renames {
            for alias in &rule.aliases {
                if !seen.insert(alias.to_lowercase()) {
                    duplicates.push((rule.canonical.clone(), alias.clone()));
                }
            }
        }
        duplicates
    }

    /// Step total for progress reporting: every rename and reweight source,
    /// sided entries already counted once per side, plus the extra work items.
    pub fn progress_steps(&self, extra: usize) -> usize {
        let renames: usize = self.renames.iter().map(|rule| rule.aliases.len()).sum();
        let reweights: usize = self.reweights.iter().map(|rule| rule.sources.len()).sum();
        renames + reweights + extra
    }
}

/// Head-of-name replacements used by the name normalizer, in table order.
pub(crate) fn name_prefixes() -> &'static [(&'static str, &'static str)] {
    tables::NAME_PREFIXES
}

/// Names already in canonical form normalize to something else (for example
/// `Left shoulder` becomes `Left_Shoulder`); accept that form as an alias so a
/// second run maps it back.
fn with_normalized_alias(mut rule: RenameRule) -> RenameRule {
    let normalized = normalize_name(&rule.canonical);
    if !names_match(&normalized, &rule.canonical)
        && !rule.aliases.iter().any(|alias| names_match(alias, &normalized))
    {
        rule.aliases.push(normalized);
    }
    rule
}
