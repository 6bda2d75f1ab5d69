//! Feature Diff Engine
//!
//! Reconciles a class's base feature list against one archetype (or an
//! ordered stack of archetypes) and produces the merged feature sequence as
//! [`DiffEntry`] rows.
//!
//! # Algorithm
//!
//! ```text
//! 1. Expand   condensed series entries targeted tier-by-tier
//!             ("Weapon Training" -> "Weapon Training 1..4")
//! 2. Claim    one base index per replacement/modification feature
//! 3. Emit     one row per base entry (Removed | Unchanged)
//!             one row per archetype feature (Modified | Added)
//! 4. Sort     stable by level; base rows precede archetype rows on ties
//! ```
//!
//! # Guarantees
//!
//! - Every entry of the expanded base list appears exactly once, as either
//!   Unchanged or Removed.
//! - Every archetype feature appears exactly once. A replacement whose target
//!   cannot be resolved still surfaces as Added (with nothing removed) so it
//!   is never silently dropped; the caller flags it for review.
//! - Output is a pure function of the inputs; repeated calls are identical.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::matcher::{locate_base, MatchPass};
use super::scalable::ScalableRegistry;
use super::types::{
    ArchetypeFeature, BaseFeature, DiffEntry, DiffStatus, FeatureKind, ParsedArchetype,
};

// ============================================================================
// DiffEngine
// ============================================================================

/// Computes base-vs-archetype diffs against a scalable-feature registry.
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine<'r> {
    registry: &'r ScalableRegistry,
    expand_series: bool,
}

impl DiffEngine<'static> {
    /// Engine backed by the shared built-in registry.
    pub fn builtin() -> Self {
        Self::new(ScalableRegistry::builtin())
    }
}

impl Default for DiffEngine<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'r> DiffEngine<'r> {
    pub fn new(registry: &'r ScalableRegistry) -> Self {
        Self {
            registry,
            expand_series: true,
        }
    }

    /// Enable or disable tier expansion.
    ///
    /// Disabled expansion behaves as if no class name were supplied.
    pub fn with_series_expansion(mut self, enabled: bool) -> Self {
        self.expand_series = enabled;
        self
    }

    pub fn registry(&self) -> &'r ScalableRegistry {
        self.registry
    }

    pub fn expands_series(&self) -> bool {
        self.expand_series
    }

    /// Series keys targeted at a specific tier by any feature of the stack.
    pub fn targeted_series(&self, archetypes: &[ParsedArchetype], class: &str) -> HashSet<String> {
        archetypes
            .iter()
            .flat_map(|archetype| archetype.targeted_features())
            .filter_map(|feature| {
                let parse = self.registry.parse_target(feature.target_text()?, class)?;
                parse.tier.map(|_| parse.base_name.to_string())
            })
            .collect()
    }

    /// Replace condensed entries of the targeted series with their tiers.
    ///
    /// A series is expanded once, from its first entry; later condensed
    /// entries of the same series are dropped since the split regenerates
    /// every tier. Entries that are already split tiers pass through, which
    /// makes expanding an expanded list a no-op.
    pub fn expand_base(
        &self,
        base: &[BaseFeature],
        targeted: &HashSet<String>,
        class: &str,
    ) -> Vec<BaseFeature> {
        let mut expanded = Vec::with_capacity(base.len());
        let mut done: HashSet<&str> = HashSet::new();

        for entry in base {
            if entry.is_split_tier() {
                expanded.push(entry.clone());
                continue;
            }

            match self.registry.get_series_base_name(&entry.display_name, class) {
                Some(key) if targeted.contains(key) => {
                    if !done.insert(key) {
                        tracing::trace!(
                            series = key,
                            feature = %entry.display_name,
                            "Dropping condensed duplicate"
                        );
                        continue;
                    }
                    match self.registry.split_into_tiers(entry, class) {
                        Some(tiers) => {
                            tracing::debug!(
                                series = key,
                                tiers = tiers.len(),
                                "Expanded condensed series"
                            );
                            expanded.extend(tiers);
                        }
                        None => expanded.push(entry.clone()),
                    }
                }
                _ => expanded.push(entry.clone()),
            }
        }

        expanded
    }

    /// Diff one archetype against the base list.
    ///
    /// `class` enables series expansion; without it only features that are
    /// not condensed series can be matched tier by tier.
    pub fn diff(
        &self,
        base: &[BaseFeature],
        archetype: &ParsedArchetype,
        class: Option<&str>,
    ) -> Vec<DiffEntry> {
        self.diff_stack(base, std::slice::from_ref(archetype), class)
    }

    /// Diff an ordered stack of archetypes against the base list.
    ///
    /// All archetypes claim from one shared set, so a base entry is removed
    /// at most once even when the stack is invalid. Stacks are expected to be
    /// validated with the stacking validator first.
    pub fn diff_stack(
        &self,
        base: &[BaseFeature],
        archetypes: &[ParsedArchetype],
        class: Option<&str>,
    ) -> Vec<DiffEntry> {
        let class = class.filter(|c| self.expand_series && !c.trim().is_empty());

        let expanded = match class {
            Some(class) => {
                let targeted = self.targeted_series(archetypes, class);
                if targeted.is_empty() {
                    base.to_vec()
                } else {
                    self.expand_base(base, &targeted, class)
                }
            }
            None => base.to_vec(),
        };

        let mut claimed: HashSet<usize> = HashSet::new();
        let mut archetype_rows = Vec::new();

        for archetype in archetypes {
            for feature in &archetype.features {
                let matched = if feature.kind.targets_base() {
                    let found = self.locate(feature, &expanded, &claimed, class);
                    if found.is_none() {
                        tracing::warn!(
                            archetype = %archetype.slug,
                            feature = %feature.name,
                            target = ?feature.target,
                            "Unmatched {} target; surfacing as an addition",
                            feature.kind
                        );
                    }
                    found
                } else {
                    None
                };

                if let Some(index) = matched {
                    claimed.insert(index);
                }

                let superseded = matched.map(|index| &expanded[index]);
                let status = match feature.kind {
                    FeatureKind::Modification => DiffStatus::Modified,
                    _ => DiffStatus::Added,
                };
                let level = feature
                    .level
                    .or_else(|| superseded.map(|b| b.level))
                    .unwrap_or(0);

                archetype_rows.push(DiffEntry::from_archetype(
                    status,
                    level,
                    feature,
                    &archetype.slug,
                    superseded,
                ));
            }
        }

        let mut entries: Vec<DiffEntry> = expanded
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let status = if claimed.contains(&index) {
                    DiffStatus::Removed
                } else {
                    DiffStatus::Unchanged
                };
                DiffEntry::from_base(status, entry)
            })
            .collect();
        entries.extend(archetype_rows);

        // stable: ties keep base rows first, each group in emission order
        entries.sort_by_key(|entry| entry.level);

        tracing::debug!(
            archetypes = archetypes.len(),
            base = base.len(),
            expanded = expanded.len(),
            removed = claimed.len(),
            rows = entries.len(),
            "Computed feature diff"
        );

        entries
    }

    /// Resolve the base index a feature claims.
    ///
    /// Tier-specific targets go straight to the split tier they name and may
    /// not fall back onto a different tier of the same series.
    fn locate(
        &self,
        feature: &ArchetypeFeature,
        expanded: &[BaseFeature],
        claimed: &HashSet<usize>,
        class: Option<&str>,
    ) -> Option<usize> {
        let hint = class
            .zip(feature.target_text())
            .and_then(|(class, target)| self.registry.parse_target(target, class))
            .and_then(|parse| parse.tier.map(|tier| (parse.base_name, tier)));

        if let Some((series, tier)) = hint {
            let by_tier = expanded.iter().enumerate().find(|(index, entry)| {
                !claimed.contains(index)
                    && entry.series_base_name() == Some(series)
                    && entry.tier_number() == Some(tier)
            });
            if let Some((index, _)) = by_tier {
                tracing::trace!(feature = %feature.name, series, tier, index, "Matched split tier");
                return Some(index);
            }
        }

        let (index, pass) = locate_base(feature, expanded, claimed)?;

        if let Some((series, tier)) = hint {
            let entry = &expanded[index];
            if pass != MatchPass::Reference
                && entry.series_base_name() == Some(series)
                && entry.tier_number() != Some(tier)
            {
                tracing::trace!(
                    feature = %feature.name,
                    series,
                    tier,
                    "Refusing match on a different tier"
                );
                return None;
            }
        }

        tracing::trace!(feature = %feature.name, index, pass = ?pass, "Matched base feature");
        Some(index)
    }
}

// ============================================================================
// Diff Helpers
// ============================================================================

/// Rows an apply layer keeps (everything but Removed), in order.
pub fn retained_entries(diff: &[DiffEntry]) -> Vec<&DiffEntry> {
    diff.iter().filter(|entry| entry.status.is_retained()).collect()
}

/// Row counts per status, for previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub unchanged: usize,
    pub removed: usize,
    pub added: usize,
    pub modified: usize,
}

impl DiffSummary {
    /// Whether the diff changes anything.
    pub fn has_changes(&self) -> bool {
        self.removed + self.added + self.modified > 0
    }
}

pub fn summarize(diff: &[DiffEntry]) -> DiffSummary {
    diff.iter().fold(DiffSummary::default(), |mut summary, entry| {
        match entry.status {
            DiffStatus::Unchanged => summary.unchanged += 1,
            DiffStatus::Removed => summary.removed += 1,
            DiffStatus::Added => summary.added += 1,
            DiffStatus::Modified => summary.modified += 1,
        }
        summary
    })
}
