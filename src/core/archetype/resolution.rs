//! Feature resolution for the archetype engine.
//!
//! Archetype text arrives as raw, unclassified features. Before the diff
//! engine can use them, each one has to become an [`ArchetypeFeature`] with a
//! kind, a target and (ideally) a level. Several sources can supply that
//! classification, and they are consulted in a fixed priority order:
//!
//! ```text
//! Priority (highest first):
//! 1. Manual fixes   (hand-curated overrides for known-bad parses)
//! 2. Database       (previously confirmed classifications)
//! 3. Auto parse     (heuristic parsing of the feature text)
//! 4. User prompt    (ask the user when nothing else could decide)
//! ```
//!
//! Each source is a [`ResolutionStrategy`]. A [`ResolutionChain`] tries them in
//! insertion order and stamps the winning strategy's [`ResolutionSource`] on
//! the feature, so downstream code never has to guess where a classification
//! came from.
//!
//! Only [`ManualFixes`] ships with the engine. Text parsing and persistence
//! live with the host application, which plugs them in as further strategies.
//!
//! # Examples
//!
//! ```rust
//! use class_archetypes::core::archetype::resolution::{ManualFixes, RawFeature, ResolutionChain};
//! use class_archetypes::core::archetype::types::{ArchetypeFeature, ResolutionSource};
//!
//! let fixes = ManualFixes::new().with_fix(
//!     "two-handed-fighter",
//!     "Shattering Strike",
//!     ArchetypeFeature::replacing("Shattering Strike", "Bravery"),
//! );
//! let chain = ResolutionChain::new().with_strategy(fixes);
//!
//! let raw = RawFeature::new("two-handed-fighter", "Shattering Strike").with_level(2);
//! let feature = chain.resolve(&raw).unwrap();
//! assert_eq!(feature.source, ResolutionSource::ManualFix);
//! assert_eq!(feature.level, Some(2));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::matcher::normalize_name;
use super::types::{ArchetypeFeature, ResolutionSource};

// ============================================================================
// RawFeature - Unclassified archetype feature
// ============================================================================

/// An archetype feature as extracted from source text, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeature {
    /// Slug of the owning archetype.
    pub archetype_slug: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl RawFeature {
    pub fn new(archetype_slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            archetype_slug: archetype_slug.into(),
            name: name.into(),
            description: String::new(),
            level: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}

// ============================================================================
// ResolutionStrategy - One source of classifications
// ============================================================================

/// A source that may be able to classify a raw feature.
///
/// Returning `None` passes the feature on to the next strategy in the chain.
pub trait ResolutionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Provenance stamped on features this strategy resolves.
    fn source(&self) -> ResolutionSource;

    /// Classify `raw`, or decline.
    fn resolve(&self, raw: &RawFeature) -> Option<ArchetypeFeature>;
}

// ============================================================================
// ManualFixes - Hand-curated override table
// ============================================================================

/// Override table keyed by archetype slug and normalized feature name.
///
/// A fix that carries no level or description inherits them from the raw
/// feature it resolves.
#[derive(Debug, Clone, Default)]
pub struct ManualFixes {
    fixes: HashMap<(String, String), ArchetypeFeature>,
}

impl ManualFixes {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(archetype_slug: &str, feature_name: &str) -> (String, String) {
        (archetype_slug.trim().to_lowercase(), normalize_name(feature_name))
    }

    /// Register a fix, replacing any previous fix for the same feature.
    pub fn insert(
        &mut self,
        archetype_slug: &str,
        feature_name: &str,
        fix: ArchetypeFeature,
    ) -> Option<ArchetypeFeature> {
        self.fixes.insert(Self::key(archetype_slug, feature_name), fix)
    }

    pub fn with_fix(
        mut self,
        archetype_slug: &str,
        feature_name: &str,
        fix: ArchetypeFeature,
    ) -> Self {
        self.insert(archetype_slug, feature_name, fix);
        self
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

impl ResolutionStrategy for ManualFixes {
    fn name(&self) -> &str {
        "manual_fixes"
    }

    fn source(&self) -> ResolutionSource {
        ResolutionSource::ManualFix
    }

    fn resolve(&self, raw: &RawFeature) -> Option<ArchetypeFeature> {
        let mut feature = self.fixes.get(&Self::key(&raw.archetype_slug, &raw.name))?.clone();
        if feature.level.is_none() {
            feature.level = raw.level;
        }
        if feature.description.is_empty() {
            feature.description = raw.description.clone();
        }
        Some(feature)
    }
}

// ============================================================================
// ResolutionChain - Ordered strategies
// ============================================================================

/// Features resolved from a batch, plus the ones nothing could classify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFeatures {
    pub features: Vec<ArchetypeFeature>,
    pub unresolved: Vec<RawFeature>,
}

impl ResolvedFeatures {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Strategies tried in insertion order; the first to answer wins.
#[derive(Default)]
pub struct ResolutionChain {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl std::fmt::Debug for ResolutionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionChain")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: impl ResolutionStrategy + 'static) -> Self {
        self.push(strategy);
        self
    }

    pub fn push(&mut self, strategy: impl ResolutionStrategy + 'static) {
        self.strategies.push(Box::new(strategy));
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve one feature, stamping the winning strategy's source.
    pub fn resolve(&self, raw: &RawFeature) -> Option<ArchetypeFeature> {
        for strategy in &self.strategies {
            if let Some(feature) = strategy.resolve(raw) {
                tracing::trace!(
                    archetype = %raw.archetype_slug,
                    feature = %raw.name,
                    strategy = strategy.name(),
                    "Resolved archetype feature"
                );
                return Some(feature.with_source(strategy.source()));
            }
        }

        tracing::debug!(
            archetype = %raw.archetype_slug,
            feature = %raw.name,
            "No strategy could resolve archetype feature"
        );
        None
    }

    /// Resolve a batch, keeping input order in both halves of the result.
    pub fn resolve_all(&self, raw_features: &[RawFeature]) -> ResolvedFeatures {
        let mut resolved = ResolvedFeatures::default();
        for raw in raw_features {
            match self.resolve(raw) {
                Some(feature) => resolved.features.push(feature),
                None => resolved.unresolved.push(raw.clone()),
            }
        }
        resolved
    }
}
