//! Property-based tests for the diff engine
//!
//! Tests invariants:
//! - Unchanged and Removed rows partition the expanded base list
//! - Every archetype feature yields exactly one Added or Modified row
//! - Output is sorted by level
//! - Identical inputs give identical outputs

use proptest::prelude::*;

use super::strategies::{arb_archetype, arb_base, arb_stack};
use crate::core::archetype::{BaseFeature, DiffEngine, DiffEntry, ParsedArchetype};

// ============================================================================
// Helpers
// ============================================================================

fn arb_class() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(Some("fighter")), Just(Some("wizard")), Just(None)]
}

/// The base list the engine diffs against after tier expansion
fn expanded_base(
    engine: &DiffEngine<'_>,
    base: &[BaseFeature],
    stack: &[ParsedArchetype],
    class: Option<&str>,
) -> Vec<BaseFeature> {
    match class {
        Some(class) => {
            let targeted = engine.targeted_series(stack, class);
            engine.expand_base(base, &targeted, class)
        }
        None => base.to_vec(),
    }
}

/// Total order over base rows, so lists can be compared regardless of position
fn base_key(feature: &BaseFeature) -> (&str, u32, &str) {
    (feature.identity.as_str(), feature.level, feature.display_name.as_str())
}

fn sorted_base_rows(diff: &[DiffEntry]) -> Vec<BaseFeature> {
    let mut rows: Vec<BaseFeature> = diff
        .iter()
        .filter(|entry| entry.status.is_base())
        .filter_map(|entry| entry.base_ref.clone())
        .collect();
    rows.sort_by(|a, b| base_key(a).cmp(&base_key(b)));
    rows
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Unchanged + Removed rows are exactly the expanded base list
    #[test]
    fn prop_base_rows_are_conserved(
        base in arb_base(),
        archetype in arb_archetype(),
        class in arb_class()
    ) {
        let engine = DiffEngine::builtin();
        let diff = engine.diff(&base, &archetype, class);

        let mut expected = expanded_base(&engine, &base, std::slice::from_ref(&archetype), class);
        expected.sort_by(|a, b| base_key(a).cmp(&base_key(b)));

        prop_assert_eq!(sorted_base_rows(&diff), expected);
    }

    /// Property: Base rows are conserved for stacks too
    #[test]
    fn prop_stack_base_rows_are_conserved(
        base in arb_base(),
        stack in arb_stack()
    ) {
        let engine = DiffEngine::builtin();
        let diff = engine.diff_stack(&base, &stack, Some("fighter"));

        let mut expected = expanded_base(&engine, &base, &stack, Some("fighter"));
        expected.sort_by(|a, b| base_key(a).cmp(&base_key(b)));

        prop_assert_eq!(sorted_base_rows(&diff), expected);
    }

    /// Property: One archetype row per archetype feature
    #[test]
    fn prop_one_row_per_archetype_feature(
        base in arb_base(),
        stack in arb_stack(),
        class in arb_class()
    ) {
        let diff = DiffEngine::builtin().diff_stack(&base, &stack, class);
        let feature_count: usize = stack.iter().map(|a| a.features.len()).sum();
        let archetype_rows = diff.iter().filter(|entry| !entry.status.is_base()).count();

        prop_assert_eq!(archetype_rows, feature_count);
    }

    /// Property: Removed rows never outnumber features that target the base
    #[test]
    fn prop_removals_bounded_by_targeting_features(
        base in arb_base(),
        stack in arb_stack()
    ) {
        let diff = DiffEngine::builtin().diff_stack(&base, &stack, Some("fighter"));
        let targeting: usize = stack
            .iter()
            .flat_map(|a| a.features.iter())
            .filter(|f| f.kind.targets_base())
            .count();
        let removed = diff
            .iter()
            .filter(|entry| entry.status.is_base() && !entry.status.is_retained())
            .count();

        prop_assert!(removed <= targeting);
    }

    /// Property: Output is non-decreasing in level
    #[test]
    fn prop_output_sorted_by_level(
        base in arb_base(),
        stack in arb_stack(),
        class in arb_class()
    ) {
        let diff = DiffEngine::builtin().diff_stack(&base, &stack, class);

        for pair in diff.windows(2) {
            prop_assert!(
                pair[0].level <= pair[1].level,
                "'{}' (level {}) sorted before '{}' (level {})",
                pair[0].name,
                pair[0].level,
                pair[1].name,
                pair[1].level
            );
        }
    }

    /// Property: Deep-equal inputs give deep-equal outputs
    #[test]
    fn prop_diff_is_idempotent(
        base in arb_base(),
        archetype in arb_archetype(),
        class in arb_class()
    ) {
        let engine = DiffEngine::builtin();
        let first = engine.diff(&base, &archetype, class);
        let second = engine.diff(&base.clone(), &archetype.clone(), class);

        prop_assert_eq!(first, second);
    }

    /// Property: Expanding an expanded list changes nothing
    #[test]
    fn prop_expansion_is_idempotent(
        base in arb_base(),
        stack in arb_stack()
    ) {
        let engine = DiffEngine::builtin();
        let targeted = engine.targeted_series(&stack, "fighter");
        let once = engine.expand_base(&base, &targeted, "fighter");
        let twice = engine.expand_base(&once, &targeted, "fighter");

        prop_assert_eq!(once, twice);
    }
}
