//! Shared input generators for the archetype property tests.

use proptest::prelude::*;

use crate::core::archetype::{ArchetypeFeature, BaseFeature, FeatureKind, ParsedArchetype};

/// Fighter-like base feature names, including two condensed series.
pub const BASE_NAMES: &[&str] = &[
    "Bonus Feat",
    "Bravery",
    "Armor Training",
    "Weapon Training",
    "Armor Mastery",
    "Weapon Mastery",
    "Cleave",
];

/// Targets an archetype parser could plausibly produce. All normalize to a
/// non-empty name.
pub const TARGETS: &[&str] = &[
    "Bravery",
    "Bravery (Ex)",
    "bonus feat",
    "Armor Training",
    "Armor Training 2",
    "Armor Training IV",
    "Armor Training 9",
    "Weapon Training 1",
    "Weapon Training III",
    "Weapon Training",
    "Weapon Mastery",
    "Wild Shape",
];

pub const CLASSES: &[&str] =
    &["fighter", "barbarian", "rogue", "ranger", "paladin", "bard", "wizard"];

/// Base list with unique identities.
pub fn arb_base() -> impl Strategy<Value = Vec<BaseFeature>> {
    prop::collection::vec((prop::sample::select(BASE_NAMES), 1u32..=20), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (name, level))| BaseFeature::new(format!("base-{}", i), level, name))
            .collect()
    })
}

pub fn arb_kind() -> impl Strategy<Value = FeatureKind> {
    prop_oneof![
        Just(FeatureKind::Replacement),
        Just(FeatureKind::Modification),
        Just(FeatureKind::Additive),
        Just(FeatureKind::Unknown),
    ]
}

pub fn arb_feature() -> impl Strategy<Value = ArchetypeFeature> {
    (
        "[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8})?",
        arb_kind(),
        prop::option::of(prop::sample::select(TARGETS)),
        prop::option::of(1u32..=20),
    )
        .prop_map(|(name, kind, target, level)| {
            let mut feature = ArchetypeFeature::new(name, kind);
            if let Some(target) = target {
                feature = feature.with_target(target);
            }
            if let Some(level) = level {
                feature = feature.with_level(level);
            }
            feature
        })
}

/// Feature guaranteed to carry a target.
pub fn arb_targeted_feature() -> impl Strategy<Value = ArchetypeFeature> {
    (arb_feature(), prop::sample::select(TARGETS))
        .prop_map(|(feature, target)| feature.with_target(target))
}

pub fn arb_archetype() -> impl Strategy<Value = ParsedArchetype> {
    ("[A-Z][a-z]{3,10}", prop::collection::vec(arb_feature(), 0..4))
        .prop_map(|(name, features)| ParsedArchetype::new(name, "fighter").with_features(features))
}

pub fn arb_stack() -> impl Strategy<Value = Vec<ParsedArchetype>> {
    prop::collection::vec(arb_archetype(), 0..5)
}
