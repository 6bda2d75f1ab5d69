//! Core data models for the archetype engine.
//!
//! This module defines the fundamental types shared by the registry, matcher,
//! diff engine and stacking validator:
//!
//! - [`FeatureId`]: Type-safe identity of a base class feature
//! - [`BaseFeature`]: An entry in a class's native feature sequence
//! - [`ArchetypeFeature`]: One classified feature of an archetype
//! - [`ParsedArchetype`]: An archetype as handed over by the parsing layer
//! - [`DiffEntry`]: One row of a base-vs-archetype diff
//! - [`Conflict`]: Two archetypes touching the same base feature or series
//!
//! # Design Notes
//!
//! - All types use `#[serde(rename_all = "camelCase")]` for IPC compatibility
//!   with the host application
//! - Inputs are consumed read-only; every engine operation returns new values

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::Result;

// ============================================================================
// FeatureId - Stable identity of a base feature
// ============================================================================

/// Type-safe wrapper for base feature identities.
///
/// The identity is opaque to the engine (a document id, UUID or compendium
/// key). It must round-trip through diffing unchanged, including onto every
/// synthetic tier produced when a condensed series is split.
///
/// # Examples
///
/// ```rust
/// use class_archetypes::core::archetype::types::FeatureId;
///
/// let id = FeatureId::new("Compendium.pf1.class-abilities.bravery");
/// assert_eq!(id.as_str(), "Compendium.pf1.class-abilities.bravery");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Create a new feature identity from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string reference.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner String.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for FeatureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// BaseFeature - Native class feature
// ============================================================================

/// Tier metadata carried by a base entry that was split out of a condensed
/// series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitTier {
    /// Registry key of the series (lowercase base name).
    pub series_base_name: String,
    /// 1-based rank within the series.
    pub tier_number: u32,
}

/// An entry in a class's native, level-ordered feature sequence.
///
/// Base features are sourced externally and read-only to the engine. A
/// condensed series entry ("Weapon Training") may be split into several
/// synthetic tier entries; those carry the original identity plus
/// [`SplitTier`] metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseFeature {
    /// Stable identity, preserved through splitting and diffing.
    pub identity: FeatureId,

    /// Class level at which the feature is granted (1-20).
    pub level: u32,

    /// Resolved display name of the feature.
    pub display_name: String,

    /// Present only on entries produced by splitting a series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitTier>,
}

impl BaseFeature {
    /// Create a base feature that is not a split tier.
    pub fn new(
        identity: impl Into<FeatureId>,
        level: u32,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            level,
            display_name: display_name.into(),
            split: None,
        }
    }

    /// Attach split-tier metadata.
    pub fn with_split(mut self, series_base_name: impl Into<String>, tier_number: u32) -> Self {
        self.split = Some(SplitTier {
            series_base_name: series_base_name.into(),
            tier_number,
        });
        self
    }

    /// Whether this entry was synthesized by splitting a series.
    #[inline]
    pub fn is_split_tier(&self) -> bool {
        self.split.is_some()
    }

    /// Series key, for split tiers.
    pub fn series_base_name(&self) -> Option<&str> {
        self.split.as_ref().map(|s| s.series_base_name.as_str())
    }

    /// Tier number, for split tiers.
    pub fn tier_number(&self) -> Option<u32> {
        self.split.as_ref().map(|s| s.tier_number)
    }

    /// Lightweight reference used by the parser to record a resolved match.
    pub fn to_ref(&self) -> BaseFeatureRef {
        BaseFeatureRef {
            identity: self.identity.clone(),
            level: self.level,
        }
    }
}

/// Reference to a base feature by identity and level.
///
/// Identity alone is ambiguous once a series is split (every tier shares it),
/// so the level is part of the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseFeatureRef {
    pub identity: FeatureId,
    pub level: u32,
}

impl BaseFeatureRef {
    pub fn new(identity: impl Into<FeatureId>, level: u32) -> Self {
        Self {
            identity: identity.into(),
            level,
        }
    }

    /// Whether the reference points at the given base entry.
    pub fn refers_to(&self, base: &BaseFeature) -> bool {
        self.identity == base.identity && self.level == base.level
    }
}

// ============================================================================
// FeatureKind / ResolutionSource - Parser classification
// ============================================================================

/// How an archetype feature relates to the base class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Replaces a base feature outright.
    Replacement,
    /// Alters a base feature; the base entry is superseded by the modified one.
    Modification,
    /// Adds a feature without touching the base list.
    Additive,
    /// The parser could not classify the feature.
    #[default]
    Unknown,
}

impl FeatureKind {
    /// Whether the kind claims a base feature (replacement or modification).
    #[inline]
    pub fn targets_base(&self) -> bool {
        matches!(self, Self::Replacement | Self::Modification)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replacement => write!(f, "replacement"),
            Self::Modification => write!(f, "modification"),
            Self::Additive => write!(f, "additive"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Provenance of a feature classification, ordered by precedence.
///
/// The parsing layer tries its strategies in this order; the winner is
/// stamped on the feature so later stages never have to re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A hand-maintained override for this archetype feature.
    ManualFix,
    /// A lookup against previously stored classifications.
    Database,
    /// Pattern-based parsing of the feature description.
    #[default]
    AutoParse,
    /// The user answered a prompt.
    UserPrompt,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManualFix => write!(f, "manual_fix"),
            Self::Database => write!(f, "database"),
            Self::AutoParse => write!(f, "auto_parse"),
            Self::UserPrompt => write!(f, "user_prompt"),
        }
    }
}

// ============================================================================
// ArchetypeFeature
// ============================================================================

/// One classified feature of an archetype.
///
/// # Examples
///
/// ```rust
/// use class_archetypes::core::archetype::types::{ArchetypeFeature, FeatureKind};
///
/// let feature = ArchetypeFeature::replacing("Heroic Defiance", "Bravery").with_level(2);
/// assert_eq!(feature.kind, FeatureKind::Replacement);
/// assert_eq!(feature.target.as_deref(), Some("Bravery"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeFeature {
    pub name: String,

    /// Level at which the archetype grants the feature, when stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    #[serde(default)]
    pub kind: FeatureKind,

    /// Free text naming the base feature(s) affected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Base feature already resolved upstream, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_base: Option<BaseFeatureRef>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub source: ResolutionSource,
}

impl ArchetypeFeature {
    /// Create a feature of the given kind with no target.
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            level: None,
            kind,
            target: None,
            matched_base: None,
            description: String::new(),
            source: ResolutionSource::default(),
        }
    }

    /// A feature that replaces `target`.
    pub fn replacing(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Replacement).with_target(target)
    }

    /// A feature that modifies `target`.
    pub fn modifying(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Modification).with_target(target)
    }

    /// A purely additive feature.
    pub fn additive(name: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Additive)
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_matched_base(mut self, base: BaseFeatureRef) -> Self {
        self.matched_base = Some(base);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: ResolutionSource) -> Self {
        self.source = source;
        self
    }

    /// Target text, if present and not blank.
    pub fn target_text(&self) -> Option<&str> {
        self.target.as_deref().filter(|t| !t.trim().is_empty())
    }
}

// ============================================================================
// ParsedArchetype
// ============================================================================

/// An archetype as produced by the parsing layer.
///
/// The unit of conflict checking and of stacking. A document without a
/// `features` array decodes to an empty archetype, which is valid input
/// that replaces nothing and conflicts with nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArchetype {
    pub name: String,

    /// Unique key of the archetype.
    pub slug: String,

    /// Class the archetype applies to, as declared by its source.
    #[serde(default)]
    pub class: String,

    #[serde(default)]
    pub features: Vec<ArchetypeFeature>,
}

impl ParsedArchetype {
    /// Create an empty archetype, deriving its slug from the name.
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            name,
            slug,
            class: class.into(),
            features: Vec::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_feature(mut self, feature: ArchetypeFeature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = ArchetypeFeature>) -> Self {
        self.features.extend(features);
        self
    }

    /// Features that name a target, in declaration order.
    pub fn targeted_features(&self) -> impl Iterator<Item = &ArchetypeFeature> {
        self.features.iter().filter(|f| f.target_text().is_some())
    }

    /// Decode an archetype document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, keeps ASCII alphanumerics, and folds every other run of
/// characters into a single hyphen.
///
/// ```rust
/// use class_archetypes::core::archetype::types::slugify;
///
/// assert_eq!(slugify("Two-Handed Fighter"), "two-handed-fighter");
/// assert_eq!(slugify("  Lore Warden (APG) "), "lore-warden-apg");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// The class an archetype is being applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDescriptor {
    /// Short tag, e.g. "fighter".
    pub tag: String,
    /// Display name, e.g. "Fighter".
    pub name: String,
}

impl ClassDescriptor {
    pub fn new(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
        }
    }
}

// ============================================================================
// DiffEntry
// ============================================================================

/// Status of one row in a feature diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Unchanged,
    Removed,
    Added,
    Modified,
}

impl DiffStatus {
    /// Whether rows with this status come from the base list.
    #[inline]
    pub fn is_base(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Removed)
    }

    /// Whether an apply layer keeps rows with this status.
    #[inline]
    pub fn is_retained(&self) -> bool {
        !matches!(self, Self::Removed)
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Removed => write!(f, "removed"),
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// One row of the merged feature sequence.
///
/// Unchanged/Removed rows carry the base entry they stand for in `base_ref`.
/// Added/Modified rows carry the archetype feature, the slug of the archetype
/// it came from, and the base entry it superseded when one was matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    pub status: DiffStatus,
    pub level: u32,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ref: Option<BaseFeature>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_feature: Option<ArchetypeFeature>,

    /// Slug of the archetype an Added/Modified row came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,

    #[serde(default)]
    pub is_split_tier: bool,
}

impl DiffEntry {
    /// Row standing for a base entry.
    pub fn from_base(status: DiffStatus, base: &BaseFeature) -> Self {
        Self {
            status,
            level: base.level,
            name: base.display_name.clone(),
            base_ref: Some(base.clone()),
            archetype_feature: None,
            archetype: None,
            is_split_tier: base.is_split_tier(),
        }
    }

    /// Row standing for an archetype feature.
    pub fn from_archetype(
        status: DiffStatus,
        level: u32,
        feature: &ArchetypeFeature,
        archetype_slug: &str,
        superseded: Option<&BaseFeature>,
    ) -> Self {
        Self {
            status,
            level,
            name: feature.name.clone(),
            base_ref: superseded.cloned(),
            archetype_feature: Some(feature.clone()),
            archetype: Some(archetype_slug.to_string()),
            is_split_tier: false,
        }
    }
}

// ============================================================================
// Conflict
// ============================================================================

/// Two archetypes touching the same base feature or feature series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Normalized target name, or the series key for series-level overlaps.
    pub feature_name: String,
    pub archetype_a: String,
    pub feature_a: String,
    pub archetype_b: String,
    pub feature_b: String,
}

impl Conflict {
    /// Name of the archetype on the other side from `name`.
    pub fn opponent_of(&self, name: &str) -> &str {
        if self.archetype_a == name {
            &self.archetype_b
        } else {
            &self.archetype_a
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}) conflicts with {} ({})",
            self.feature_name, self.archetype_a, self.feature_a, self.archetype_b, self.feature_b
        )
    }
}
