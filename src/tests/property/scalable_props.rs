//! Property-based tests for the scalable series registry
//!
//! Tests invariants:
//! - Series conflict checks are order-independent
//! - Splitting a known series yields one entry per tier at registry levels
//! - Every split tier keeps the original identity

use proptest::prelude::*;

use super::strategies::{CLASSES, TARGETS};
use crate::core::archetype::{BaseFeature, ScalableRegistry};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Every (class, series key) pair in the built-in table
fn builtin_series() -> Vec<(String, String)> {
    let registry = ScalableRegistry::builtin();
    CLASSES
        .iter()
        .flat_map(|class| {
            registry
                .series_for_class(class)
                .map(move |series| (class.to_string(), series.base_name.clone()))
        })
        .collect()
}

fn arb_target() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(TARGETS).prop_map(str::to_string),
        prop::sample::select(
            &["Trap Sense 3", "trap sense", "Smite Evil II", "Favored Enemy (Ex) 2", "Mercy"][..]
        )
        .prop_map(str::to_string),
        "[a-zA-Z ]{0,20}",
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Series conflict checks ignore argument order
    #[test]
    fn prop_series_conflict_is_symmetric(
        a in arb_target(),
        b in arb_target(),
        class in prop::sample::select(CLASSES)
    ) {
        let registry = ScalableRegistry::builtin();
        prop_assert_eq!(
            registry.check_series_conflict(&a, &b, class),
            registry.check_series_conflict(&b, &a, class)
        );
    }

    /// Property: A target always conflicts with itself when it names a series
    #[test]
    fn prop_series_target_conflicts_with_itself(
        target in arb_target(),
        class in prop::sample::select(CLASSES)
    ) {
        let registry = ScalableRegistry::builtin();
        let check = registry.check_series_conflict(&target, &target, class);
        prop_assert_eq!(check.conflict, registry.series_key_for_target(&target, class).is_some());
    }

    /// Property: Splitting yields exactly the registry's tiers, sharing identity
    #[test]
    fn prop_split_matches_registry(
        index in any::<prop::sample::Index>(),
        identity in "[a-z0-9.-]{1,30}",
        level in 1u32..=20
    ) {
        let registry = ScalableRegistry::builtin();
        let known = builtin_series();
        let (class, key) = index.get(&known);
        let series = registry.series(class, key).unwrap();

        let base = BaseFeature::new(identity.as_str(), level, key.as_str());
        let tiers = registry.split_into_tiers(&base, class).unwrap();

        prop_assert_eq!(tiers.len(), series.tiers.len());
        for (split, tier) in tiers.iter().zip(&series.tiers) {
            prop_assert_eq!(split.level, tier.level);
            prop_assert_eq!(&split.identity, &base.identity);
            prop_assert_eq!(split.tier_number(), Some(tier.tier));
            prop_assert_eq!(split.series_base_name(), Some(key.as_str()));
        }

        // Splitting is not repeatable on its own output
        prop_assert!(registry.split_into_tiers(&tiers[0], class).is_none());
    }
}
