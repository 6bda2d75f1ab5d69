//! Property-based tests for name normalization and matching
//!
//! Tests invariants:
//! - Normalizing a normalized name is a no-op
//! - Normalized names are lowercase and trimmed
//! - Every name matches itself

use proptest::prelude::*;

use crate::core::archetype::matcher::{match_target_index, normalize_name};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Feature-name-like text with tier suffixes and parentheticals mixed in
fn arb_feature_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ()IVXivx+']{0,40}"
}

fn arb_plain_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10})?"
}

/// A plain name paired with the same name decorated by a parenthetical
/// and/or a tier suffix
fn arb_decorated_name() -> impl Strategy<Value = (String, String)> {
    (
        arb_plain_name(),
        prop::option::of(prop_oneof![
            (1u32..30).prop_map(|n| format!(" {}", n)),
            prop::sample::select(&["I", "II", "III", "IV", "V", "ix", "x"][..])
                .prop_map(|r| format!(" {}", r)),
        ]),
        prop::option::of(Just(" (Ex)")),
    )
        .prop_map(|(name, tier, suffix)| {
            let decorated = format!("{}{}{}", name, suffix.unwrap_or(""), tier.unwrap_or_default());
            (name, decorated)
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Normalization is idempotent
    #[test]
    fn prop_normalize_is_idempotent(name in arb_feature_name()) {
        let once = normalize_name(&name);
        let twice = normalize_name(&once);

        prop_assert_eq!(
            &twice,
            &once,
            "Re-normalizing '{}' changed it",
            name
        );
    }

    /// Property: Normalized output is lowercase and trimmed
    #[test]
    fn prop_normalize_output_shape(name in arb_feature_name()) {
        let normalized = normalize_name(&name);

        prop_assert_eq!(normalized.clone(), normalized.to_lowercase());
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "), "Whitespace run left in '{}'", normalized);
    }

    /// Property: Parentheticals and tier suffixes never survive normalization
    #[test]
    fn prop_decorations_are_stripped((plain, decorated) in arb_decorated_name()) {
        prop_assert_eq!(
            normalize_name(&decorated),
            normalize_name(&plain),
            "'{}' and '{}' normalized differently",
            decorated,
            plain
        );
    }

    /// Property: A non-blank name matches itself
    #[test]
    fn prop_name_matches_itself(
        others in prop::collection::vec(arb_plain_name(), 0..5),
        name in arb_plain_name()
    ) {
        let mut candidates = others;
        candidates.push(name.clone());

        let index = match_target_index(&name, &candidates);
        prop_assert!(index.is_some(), "'{}' did not match itself", name);

        // Exact hits win, so the first identical candidate is returned
        let first_identical = candidates.iter().position(|c| c.eq_ignore_ascii_case(&name));
        prop_assert_eq!(index, first_identical);
    }

    /// Property: Matching is deterministic
    #[test]
    fn prop_matching_is_deterministic(
        target in arb_feature_name(),
        candidates in prop::collection::vec(arb_feature_name(), 0..6)
    ) {
        prop_assert_eq!(
            match_target_index(&target, &candidates),
            match_target_index(&target, &candidates)
        );
    }
}
