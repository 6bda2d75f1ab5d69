//! Conflict & Stacking Validator
//!
//! Decides whether archetypes can coexist on one class. The governing rule:
//! no two archetypes may touch the same base feature, and touching any tier
//! of a scalable series conflicts with touching any other tier of it.
//!
//! Two detection paths are unioned and de-duplicated per feature pair:
//!
//! - **Exact**: normalized target names are equal ("Bravery" / "bravery (ex)")
//! - **Series**: targets resolve to the same registry series
//!   ("Weapon Training 1" / "Weapon Training III")
//!
//! Every operation is a pure function of its arguments. Nothing is cached
//! between calls, so checks can be re-run after each incremental stack
//! change without going stale.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::matcher::normalize_name;
use super::scalable::ScalableRegistry;
use super::types::{ArchetypeFeature, ClassDescriptor, Conflict, FeatureKind, ParsedArchetype};

// ============================================================================
// Result Types
// ============================================================================

/// Two archetypes that conflict somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictPair {
    pub archetype_a: String,
    pub archetype_b: String,
}

/// Outcome of validating a whole stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackValidation {
    pub valid: bool,
    pub conflicts: Vec<Conflict>,
    pub conflict_pairs: Vec<ConflictPair>,
}

/// Whether one archetype can join an already-applied set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCheck {
    pub can_apply: bool,
    pub conflicts: Vec<Conflict>,
    /// Names of applied archetypes that block the candidate, de-duplicated.
    pub blocked_by: Vec<String>,
}

/// One replacement or modification recorded against a base feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementEntry {
    pub archetype_name: String,
    pub feature_name: String,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub target: String,
}

/// Every replacement across a stack, grouped by normalized target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeReplacements {
    /// Number of entries, not of distinct targets.
    pub total_replaced: usize,
    pub replacements: IndexMap<String, Vec<ReplacementEntry>>,
}

/// Outcome of adding one archetype to a running stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackAddition {
    pub valid: bool,
    pub conflicts: Vec<Conflict>,
    /// Replacements over the stack including the candidate.
    pub cumulative: CumulativeReplacements,
}

/// Outcome of removing one archetype from a running stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRemoval {
    /// The slug was present and the remaining stack is conflict-free.
    pub valid: bool,
    pub remaining_stack: Vec<ParsedArchetype>,
    /// Replacements over the remaining stack.
    pub cumulative: CumulativeReplacements,
}

// ============================================================================
// StackValidator
// ============================================================================

/// Class used for series lookups between two archetypes.
fn series_class<'a>(a: &'a ParsedArchetype, b: &'a ParsedArchetype) -> Option<&'a str> {
    [a.class.as_str(), b.class.as_str()]
        .into_iter()
        .find(|class| !class.trim().is_empty())
}

/// Comparison key of a feature's target, for every feature that has one.
///
/// Targets that normalize away entirely ("(Ex)") fall back to their trimmed,
/// lowercased text so applying the same archetype twice is still caught.
fn target_key(feature: &ArchetypeFeature) -> Option<String> {
    let target = feature.target.as_deref()?;
    let key = normalize_name(target);
    if key.is_empty() {
        Some(target.trim().to_lowercase())
    } else {
        Some(key)
    }
}

/// Validates archetype stacks against a scalable-feature registry.
#[derive(Debug, Clone, Copy)]
pub struct StackValidator<'r> {
    registry: &'r ScalableRegistry,
}

impl StackValidator<'static> {
    /// Validator backed by the shared built-in registry.
    pub fn builtin() -> Self {
        Self::new(ScalableRegistry::builtin())
    }
}

impl Default for StackValidator<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'r> StackValidator<'r> {
    pub fn new(registry: &'r ScalableRegistry) -> Self {
        Self { registry }
    }

    /// Conflicts between two archetypes.
    ///
    /// Exact-name overlaps are reported first (in `b`'s feature order), then
    /// series-level overlaps not already covered by the same feature pair.
    pub fn detect_conflicts(&self, a: &ParsedArchetype, b: &ParsedArchetype) -> Vec<Conflict> {
        let mut indexed: HashMap<String, &ArchetypeFeature> = HashMap::new();
        for feature in &a.features {
            if let Some(key) = target_key(feature) {
                indexed.entry(key).or_insert(feature);
            }
        }

        let mut conflicts = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut record = |conflicts: &mut Vec<Conflict>, conflict: Conflict| {
            if seen.insert((conflict.feature_a.clone(), conflict.feature_b.clone())) {
                conflicts.push(conflict);
            }
        };

        for feature_b in &b.features {
            let Some(key) = target_key(feature_b) else {
                continue;
            };
            if let Some(feature_a) = indexed.get(&key) {
                record(
                    &mut conflicts,
                    Conflict {
                        feature_name: key,
                        archetype_a: a.name.clone(),
                        feature_a: feature_a.name.clone(),
                        archetype_b: b.name.clone(),
                        feature_b: feature_b.name.clone(),
                    },
                );
            }
        }

        if let Some(class) = series_class(a, b) {
            for feature_a in a.targeted_features() {
                for feature_b in b.targeted_features() {
                    let (Some(target_a), Some(target_b)) =
                        (feature_a.target_text(), feature_b.target_text())
                    else {
                        continue;
                    };
                    let check = self.registry.check_series_conflict(target_a, target_b, class);
                    if let Some(series) = check.series.filter(|_| check.conflict) {
                        record(
                            &mut conflicts,
                            Conflict {
                                feature_name: series,
                                archetype_a: a.name.clone(),
                                feature_a: feature_a.name.clone(),
                                archetype_b: b.name.clone(),
                                feature_b: feature_b.name.clone(),
                            },
                        );
                    }
                }
            }
        }

        if !conflicts.is_empty() {
            tracing::debug!(
                archetype_a = %a.slug,
                archetype_b = %b.slug,
                conflicts = conflicts.len(),
                "Archetype conflicts detected"
            );
        }

        conflicts
    }

    /// Validate every pair of a stack.
    ///
    /// Stacks of zero or one archetype are always valid. The same archetype
    /// listed twice conflicts with itself whenever it targets anything.
    pub fn validate_stack(&self, archetypes: &[ParsedArchetype]) -> StackValidation {
        let mut conflicts = Vec::new();
        let mut conflict_pairs: Vec<ConflictPair> = Vec::new();

        for (i, a) in archetypes.iter().enumerate() {
            for b in &archetypes[i + 1..] {
                let found = self.detect_conflicts(a, b);
                if found.is_empty() {
                    continue;
                }
                let pair = ConflictPair {
                    archetype_a: a.name.clone(),
                    archetype_b: b.name.clone(),
                };
                if !conflict_pairs.contains(&pair) {
                    conflict_pairs.push(pair);
                }
                conflicts.extend(found);
            }
        }

        tracing::debug!(
            stack = archetypes.len(),
            conflicts = conflicts.len(),
            "Validated archetype stack"
        );

        StackValidation {
            valid: conflicts.is_empty(),
            conflicts,
            conflict_pairs,
        }
    }

    /// Whether `candidate` can be applied on top of `applied`.
    pub fn check_can_apply(
        &self,
        candidate: &ParsedArchetype,
        applied: &[ParsedArchetype],
    ) -> ApplyCheck {
        let conflicts: Vec<Conflict> = applied
            .iter()
            .flat_map(|existing| self.detect_conflicts(candidate, existing))
            .collect();

        let mut blocked_by: Vec<String> = Vec::new();
        for conflict in &conflicts {
            let opponent = conflict.opponent_of(&candidate.name);
            if !blocked_by.iter().any(|name| name == opponent) {
                blocked_by.push(opponent.to_string());
            }
        }

        ApplyCheck {
            can_apply: conflicts.is_empty(),
            conflicts,
            blocked_by,
        }
    }

    /// Check adding `candidate` to `current_stack`.
    pub fn validate_add_to_stack(
        &self,
        candidate: &ParsedArchetype,
        current_stack: &[ParsedArchetype],
    ) -> StackAddition {
        let check = self.check_can_apply(candidate, current_stack);

        let mut resulting = current_stack.to_vec();
        resulting.push(candidate.clone());

        StackAddition {
            valid: check.can_apply,
            conflicts: check.conflicts,
            cumulative: get_cumulative_replacements(&resulting),
        }
    }

    /// Check removing the archetype with `slug` from `current_stack`.
    pub fn validate_remove_from_stack(
        &self,
        slug: &str,
        current_stack: &[ParsedArchetype],
    ) -> StackRemoval {
        let remaining_stack: Vec<ParsedArchetype> = current_stack
            .iter()
            .filter(|archetype| archetype.slug != slug)
            .cloned()
            .collect();

        let found = remaining_stack.len() < current_stack.len();
        if !found {
            tracing::debug!(slug, "Archetype to remove is not in the stack");
        }

        let valid = found && self.validate_stack(&remaining_stack).valid;
        let cumulative = get_cumulative_replacements(&remaining_stack);

        StackRemoval {
            valid,
            remaining_stack,
            cumulative,
        }
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Group every replacement and modification of a stack by normalized target.
///
/// Over a conflict-free stack every key holds exactly one entry, so
/// `total_replaced` equals the number of keys.
pub fn get_cumulative_replacements(archetypes: &[ParsedArchetype]) -> CumulativeReplacements {
    let mut cumulative = CumulativeReplacements::default();

    for archetype in archetypes {
        for feature in archetype.features.iter().filter(|f| f.kind.targets_base()) {
            let (Some(target), Some(key)) = (feature.target.as_deref(), target_key(feature)) else {
                continue;
            };
            cumulative
                .replacements
                .entry(key)
                .or_default()
                .push(ReplacementEntry {
                    archetype_name: archetype.name.clone(),
                    feature_name: feature.name.clone(),
                    kind: feature.kind,
                    target: target.to_string(),
                });
            cumulative.total_replaced += 1;
        }
    }

    cumulative
}

/// Whether an archetype declares the given class, by tag or display name.
pub fn validate_class(archetype: &ParsedArchetype, class: &ClassDescriptor) -> bool {
    let declared = archetype.class.trim().to_lowercase();
    !declared.is_empty()
        && (declared == class.tag.trim().to_lowercase()
            || declared == class.name.trim().to_lowercase())
}
