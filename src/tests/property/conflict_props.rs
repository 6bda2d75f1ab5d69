//! Property-based tests for stacking validation
//!
//! Tests invariants:
//! - Every subset of a valid stack is valid
//! - An archetype stacked with itself conflicts
//! - Conflict detection finds the same overlaps in either order
//! - Cumulative replacements count every targeting feature

use proptest::prelude::*;

use super::strategies::{arb_archetype, arb_stack, arb_targeted_feature};
use crate::core::archetype::{get_cumulative_replacements, ParsedArchetype, StackValidator};

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Removing archetypes from a valid stack keeps it valid
    #[test]
    fn prop_valid_stack_subsets_are_valid(stack in arb_stack()) {
        let validator = StackValidator::builtin();
        prop_assume!(validator.validate_stack(&stack).valid);

        for mask in 0u32..(1 << stack.len()) {
            let subset: Vec<ParsedArchetype> = stack
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, archetype)| archetype.clone())
                .collect();

            prop_assert!(
                validator.validate_stack(&subset).valid,
                "Subset {:b} of a valid stack was invalid",
                mask
            );
        }
    }

    /// Property: An archetype with a target conflicts with itself
    #[test]
    fn prop_self_stack_conflicts(
        archetype in arb_archetype(),
        targeted in arb_targeted_feature()
    ) {
        let archetype = archetype.with_feature(targeted);
        let validation = StackValidator::builtin().validate_stack(&[archetype.clone(), archetype]);

        prop_assert!(!validation.valid);
        prop_assert_eq!(validation.conflict_pairs.len(), 1);
    }

    /// Property: Conflict counts do not depend on argument order
    #[test]
    fn prop_conflict_detection_is_order_independent(
        a in arb_archetype(),
        b in arb_archetype()
    ) {
        let validator = StackValidator::builtin();
        let forward = validator.detect_conflicts(&a, &b);
        let backward = validator.detect_conflicts(&b, &a);

        prop_assert_eq!(forward.is_empty(), backward.is_empty());
    }

    /// Property: Validation agrees with the incremental add check
    #[test]
    fn prop_add_check_matches_validation(
        stack in arb_stack(),
        candidate in arb_archetype()
    ) {
        let validator = StackValidator::builtin();
        prop_assume!(validator.validate_stack(&stack).valid);

        let addition = validator.validate_add_to_stack(&candidate, &stack);
        let mut grown = stack.clone();
        grown.push(candidate);

        prop_assert_eq!(addition.valid, validator.validate_stack(&grown).valid);
    }

    /// Property: Every replacing or modifying feature is counted once
    #[test]
    fn prop_cumulative_counts_targeting_features(stack in arb_stack()) {
        let cumulative = get_cumulative_replacements(&stack);
        let expected = stack
            .iter()
            .flat_map(|a| a.features.iter())
            .filter(|f| f.kind.targets_base() && f.target_text().is_some())
            .count();

        prop_assert_eq!(cumulative.total_replaced, expected);
        prop_assert_eq!(
            cumulative.replacements.values().map(Vec::len).sum::<usize>(),
            expected
        );
    }
}
