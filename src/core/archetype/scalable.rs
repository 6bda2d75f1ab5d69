//! Scalable Feature Registry
//!
//! Some class features are a progression granted again at several levels
//! (Weapon Training at 5, 9, 13 and 17). Class data usually carries such a
//! progression as one condensed entry. The registry knows which names are
//! series, which tier a target text names, and how to split a condensed
//! entry back into one entry per tier so an archetype can target a single
//! rank.
//!
//! # Lookup keys
//!
//! Series are keyed by `(class, base name)`, both lowercase. Base names are
//! stored in [`normalize_name`] form ("weapon training"). Unknown classes and
//! unrecognized names are never errors: every lookup returns `None` and the
//! caller treats the feature as not scalable.
//!
//! # Immutability
//!
//! A registry is built once (from the built-in table, configuration, or
//! both) and then only read. [`ScalableRegistry::builtin`] is shared
//! process-wide.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::error::{ArchetypeError, Result};
use super::matcher::{
    normalize_name, roman_value, strip_parentheticals, TRAILING_INTEGER, TRAILING_ROMAN,
};
use super::types::BaseFeature;

// ============================================================================
// Built-in Series Table
// ============================================================================

/// Built-in progressions.
/// Format: (class, display name, tier levels)
static BUILTIN_SERIES: Lazy<Vec<(&'static str, &'static str, &'static [u32])>> = Lazy::new(|| {
    vec![
        // Fighter
        ("fighter", "Weapon Training", &[5u32, 9, 13, 17] as &[u32]),
        ("fighter", "Armor Training", &[3u32, 7, 11, 15] as &[u32]),
        // Barbarian
        ("barbarian", "Trap Sense", &[3u32, 6, 9, 12, 15, 18] as &[u32]),
        ("barbarian", "Damage Reduction", &[7u32, 10, 13, 16, 19] as &[u32]),
        // Rogue
        ("rogue", "Trap Sense", &[3u32, 6, 9, 12, 15, 18] as &[u32]),
        // Ranger
        ("ranger", "Favored Enemy", &[1u32, 5, 10, 15, 20] as &[u32]),
        ("ranger", "Favored Terrain", &[3u32, 8, 13, 18] as &[u32]),
        // Paladin
        ("paladin", "Smite Evil", &[1u32, 4, 7, 10, 13, 16, 19] as &[u32]),
        ("paladin", "Mercy", &[3u32, 6, 9, 12, 15, 18] as &[u32]),
        // Bard
        ("bard", "Versatile Performance", &[2u32, 6, 10, 14, 18] as &[u32]),
    ]
});

static BUILTIN_REGISTRY: Lazy<ScalableRegistry> = Lazy::new(ScalableRegistry::builtin_table);

// ============================================================================
// Series Types
// ============================================================================

/// One rank of a scalable series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTier {
    /// 1-based rank.
    pub tier: u32,
    /// Class level granting this rank.
    pub level: u32,
    /// Display name of the rank, e.g. "Weapon Training 3".
    pub name: String,
}

/// A multi-tier progression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalableSeries {
    /// Normalized base name, also the registry key.
    pub base_name: String,
    /// Tiers in rank order.
    pub tiers: Vec<SeriesTier>,
}

impl ScalableSeries {
    /// Build a series whose tiers are named "<display name> <tier>".
    pub fn from_levels(display_name: &str, levels: &[u32]) -> Self {
        let tiers = levels
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                let tier = i as u32 + 1;
                SeriesTier {
                    tier,
                    level,
                    name: format!("{} {}", display_name, tier),
                }
            })
            .collect();

        Self {
            base_name: normalize_name(display_name),
            tiers,
        }
    }

    /// Tier with the given rank.
    pub fn tier(&self, tier: u32) -> Option<&SeriesTier> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Check tier numbers and levels are positive and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ArchetypeError::InvalidSeries {
            base_name: self.base_name.clone(),
            reason,
        };

        if self.base_name.is_empty() {
            return Err(invalid("base name is empty after normalization".to_string()));
        }
        if self.tiers.is_empty() {
            return Err(invalid("series has no tiers".to_string()));
        }

        let mut previous: Option<&SeriesTier> = None;
        for tier in &self.tiers {
            if tier.tier == 0 || tier.level == 0 {
                return Err(invalid(format!(
                    "tier {} at level {}: tier numbers and levels start at 1",
                    tier.tier, tier.level
                )));
            }
            if let Some(prev) = previous {
                if tier.tier <= prev.tier || tier.level <= prev.level {
                    return Err(invalid(format!(
                        "tier {} (level {}) does not follow tier {} (level {})",
                        tier.tier, tier.level, prev.tier, prev.level
                    )));
                }
            }
            previous = Some(tier);
        }

        Ok(())
    }
}

/// A series declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDefinition {
    pub class: String,
    pub base_name: String,
    pub tiers: Vec<SeriesTier>,
}

/// Result of reading a target text against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetParse<'a> {
    /// Registry key of the series.
    pub base_name: &'a str,
    /// Rank named by the text; `None` when the series is named generically.
    pub tier: Option<u32>,
    pub series: &'a ScalableSeries,
}

/// Outcome of a series-level conflict check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeriesConflict {
    pub conflict: bool,
    /// Shared series key when `conflict` is set.
    pub series: Option<String>,
}

// ============================================================================
// ScalableRegistry
// ============================================================================

fn class_key(class: &str) -> String {
    class.trim().to_lowercase()
}

/// Whether `key` is a word-aligned prefix of `text`.
fn is_word_prefix(text: &str, key: &str) -> bool {
    text.starts_with(key)
        && text[key.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
}

/// Parse a standalone tier token ("3", "iii").
fn parse_tier_token(token: &str) -> Option<u32> {
    let token = token.trim();
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return Some(parse_tier_number(token));
    }
    roman_value(token)
}

/// Tier named by a run of digits. Runs too large for `u32` saturate, so they
/// still name a tier no series has instead of reading as a generic target.
fn parse_tier_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Static table of scalable series, keyed by class then base name.
#[derive(Debug, Clone, Default)]
pub struct ScalableRegistry {
    classes: IndexMap<String, IndexMap<String, ScalableSeries>>,
}

impl ScalableRegistry {
    /// Registry with no series at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shared built-in registry.
    pub fn builtin() -> &'static ScalableRegistry {
        &BUILTIN_REGISTRY
    }

    /// Build a fresh copy of the built-in table.
    pub fn builtin_table() -> Self {
        let mut registry = Self::empty();
        for (class, display_name, levels) in BUILTIN_SERIES.iter() {
            registry.insert(class, ScalableSeries::from_levels(display_name, levels));
        }
        registry
    }

    /// Build a registry from configured definitions.
    ///
    /// Definitions extend the built-in table when `include_builtin` is set,
    /// replacing built-in series with the same key.
    ///
    /// # Errors
    ///
    /// - `ArchetypeError::InvalidSeries` if a definition fails validation
    /// - `ArchetypeError::DuplicateSeries` if two definitions share a key
    pub fn from_definitions(
        include_builtin: bool,
        definitions: &[SeriesDefinition],
    ) -> Result<Self> {
        let mut registry = if include_builtin {
            Self::builtin_table()
        } else {
            Self::empty()
        };

        let mut seen = std::collections::HashSet::new();
        for definition in definitions {
            let series = ScalableSeries {
                base_name: normalize_name(&definition.base_name),
                tiers: definition.tiers.clone(),
            };
            series.validate()?;

            let class = class_key(&definition.class);
            if !seen.insert((class.clone(), series.base_name.clone())) {
                return Err(ArchetypeError::DuplicateSeries {
                    class,
                    base_name: series.base_name,
                });
            }
            registry.insert(&class, series);
        }

        tracing::debug!(
            classes = registry.classes.len(),
            series = registry.len(),
            configured = definitions.len(),
            "Built scalable feature registry"
        );

        Ok(registry)
    }

    fn insert(&mut self, class: &str, series: ScalableSeries) {
        self.classes
            .entry(class_key(class))
            .or_default()
            .insert(series.base_name.clone(), series);
    }

    /// Total number of series across all classes.
    pub fn len(&self) -> usize {
        self.classes.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Series registered for `class` under `base_name` (normalized on lookup).
    pub fn series(&self, class: &str, base_name: &str) -> Option<&ScalableSeries> {
        self.classes
            .get(&class_key(class))?
            .get(&normalize_name(base_name))
    }

    /// All series of a class, in definition order.
    pub fn series_for_class(&self, class: &str) -> impl Iterator<Item = &ScalableSeries> {
        self.classes
            .get(&class_key(class))
            .into_iter()
            .flat_map(|series| series.values())
    }

    /// Read a target text as a reference to a series, and possibly a tier.
    ///
    /// Strategies, first success wins:
    ///
    /// 1. exact match of the cleaned text against a series key
    /// 2. trailing integer ("Weapon Training 3")
    /// 3. trailing Roman numeral I-X ("Weapon Training III")
    /// 4. fuzzy: longest key that prefixes the text, then longest key the
    ///    text contains
    pub fn parse_target(&self, text: &str, class: &str) -> Option<TargetParse<'_>> {
        let series_map = self.classes.get(&class_key(class))?;
        let cleaned = strip_parentheticals(&text.to_lowercase());
        if cleaned.is_empty() {
            return None;
        }

        let found = |key: &str, tier: Option<u32>| {
            series_map
                .get_key_value(key)
                .map(|(base_name, series)| TargetParse {
                    base_name: base_name.as_str(),
                    tier,
                    series,
                })
        };

        if let Some(parse) = found(&cleaned, None) {
            return Some(parse);
        }

        if let Some(caps) = TRAILING_INTEGER.captures(&cleaned) {
            let head = cleaned[..caps.get(0).map_or(0, |m| m.start())].trim();
            let tier = parse_tier_number(&caps[1]);
            if let Some(parse) = found(head, Some(tier)) {
                return Some(parse);
            }
        }

        if let Some(caps) = TRAILING_ROMAN.captures(&cleaned) {
            let head = cleaned[..caps.get(0).map_or(0, |m| m.start())].trim();
            if let Some(tier) = roman_value(&caps[1]) {
                if let Some(parse) = found(head, Some(tier)) {
                    return Some(parse);
                }
            }
        }

        let longest = |pred: &dyn Fn(&str) -> bool| {
            series_map
                .iter()
                .filter(|(key, _)| pred(key.as_str()))
                .fold(None::<(&String, &ScalableSeries)>, |best, candidate| match best {
                    Some(b) if b.0.len() >= candidate.0.len() => Some(b),
                    _ => Some(candidate),
                })
        };

        if let Some((key, series)) = longest(&|key: &str| is_word_prefix(&cleaned, key)) {
            let tier = parse_tier_token(&cleaned[key.len()..]);
            return Some(TargetParse {
                base_name: key.as_str(),
                tier,
                series,
            });
        }

        longest(&|key: &str| cleaned.contains(key)).map(|(key, series)| TargetParse {
            base_name: key.as_str(),
            tier: None,
            series,
        })
    }

    /// Series key a resolved base feature name belongs to.
    ///
    /// Strips a parenthetical, a trailing integer and a trailing Roman
    /// numeral, then checks for an exact key and finally a word-aligned key
    /// prefix ("Sneak Attack +1d6" style names).
    pub fn get_series_base_name(&self, resolved_name: &str, class: &str) -> Option<&str> {
        let series_map = self.classes.get(&class_key(class))?;

        let mut name = strip_parentheticals(&resolved_name.to_lowercase());
        name = TRAILING_INTEGER.replace(&name, "").into_owned();
        name = TRAILING_ROMAN.replace(&name, "").trim().to_string();
        if name.is_empty() {
            return None;
        }

        if let Some((key, _)) = series_map.get_key_value(name.as_str()) {
            return Some(key.as_str());
        }

        series_map
            .keys()
            .filter(|key| is_word_prefix(&name, key))
            .fold(None::<&String>, |best, key| match best {
                Some(b) if b.len() >= key.len() => Some(b),
                _ => Some(key),
            })
            .map(String::as_str)
    }

    /// Series key named by a free-text target, generic or tier-specific.
    pub fn series_key_for_target(&self, target: &str, class: &str) -> Option<&str> {
        self.parse_target(target, class)
            .map(|parse| parse.base_name)
            .or_else(|| self.get_series_base_name(target, class))
    }

    /// Split a condensed series entry into one entry per tier.
    ///
    /// Every tier keeps the original identity and gains split metadata.
    /// Returns `None` for names that are not a series of `class`, and for
    /// entries that are already split tiers.
    pub fn split_into_tiers(&self, base: &BaseFeature, class: &str) -> Option<Vec<BaseFeature>> {
        if base.is_split_tier() {
            return None;
        }

        let key = self.get_series_base_name(&base.display_name, class)?;
        let series = self.classes.get(&class_key(class))?.get(key)?;

        Some(
            series
                .tiers
                .iter()
                .map(|tier| {
                    BaseFeature::new(base.identity.clone(), tier.level, tier.name.clone())
                        .with_split(series.base_name.clone(), tier.tier)
                })
                .collect(),
        )
    }

    /// Whether two targets touch the same series.
    ///
    /// Tier numbers are ignored: touching any rank of a series conflicts
    /// with touching any other rank of it.
    pub fn check_series_conflict(
        &self,
        target_a: &str,
        target_b: &str,
        class: &str,
    ) -> SeriesConflict {
        match (
            self.series_key_for_target(target_a, class),
            self.series_key_for_target(target_b, class),
        ) {
            (Some(a), Some(b)) if a == b => SeriesConflict {
                conflict: true,
                series: Some(a.to_string()),
            },
            _ => SeriesConflict::default(),
        }
    }
}
