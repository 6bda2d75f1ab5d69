//! Feature Name Matching
//!
//! Resolves free-text targets ("replaces weapon training 3") against a list
//! of base feature names. Matching is a strict pass chain, first hit wins:
//!
//! 1. exact, case-insensitive
//! 2. [`normalize_name`] equality
//! 3. substring containment of normalized forms, in either direction
//!
//! Pass 1 must precede pass 2: "Armor Training 2" literally present in the
//! candidate list wins over the first candidate that merely normalizes to
//! "armor training". Reordering the passes changes results.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{ArchetypeFeature, BaseFeature};

// ============================================================================
// Normalization Patterns
// ============================================================================

/// Innermost parenthetical group; applied repeatedly to handle nesting.
static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)").expect("Failed to compile parenthetical regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Trailing tier number: "weapon training 3"
pub(crate) static TRAILING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(\d+)$").expect("Failed to compile trailing integer regex"));

/// Trailing Roman numeral I-X: "weapon training iii"
pub(crate) static TRAILING_ROMAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(viii|vii|vi|iv|ix|iii|ii|i|v|x)$")
        .expect("Failed to compile trailing roman numeral regex")
});

/// Value of a Roman numeral in the I-X range.
pub(crate) fn roman_value(numeral: &str) -> Option<u32> {
    let value = match numeral.to_ascii_lowercase().as_str() {
        "i" => 1,
        "ii" => 2,
        "iii" => 3,
        "iv" => 4,
        "v" => 5,
        "vi" => 6,
        "vii" => 7,
        "viii" => 8,
        "ix" => 9,
        "x" => 10,
        _ => return None,
    };
    Some(value)
}

/// Remove every parenthetical group, leaving a space so adjacent words stay
/// separated, then collapse whitespace and trim.
pub(crate) fn strip_parentheticals(text: &str) -> String {
    let mut current = text.to_string();
    while PARENTHETICAL.is_match(&current) {
        current = PARENTHETICAL.replace_all(&current, " ").into_owned();
    }
    WHITESPACE_RUN.replace_all(&current, " ").trim().to_string()
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a feature name for comparison.
///
/// Lowercases, drops parenthetical groups, collapses whitespace, and strips
/// trailing tier numbers (integer or Roman I-X). Stripping repeats until the
/// name stops changing, so the result is a fixed point:
/// `normalize_name(&normalize_name(x)) == normalize_name(x)`.
///
/// # Examples
///
/// ```rust
/// use class_archetypes::core::archetype::matcher::normalize_name;
///
/// assert_eq!(normalize_name("Weapon Training 3"), "weapon training");
/// assert_eq!(normalize_name("Armor Training (Ex) II"), "armor training");
/// assert_eq!(normalize_name(""), "");
/// ```
pub fn normalize_name(name: &str) -> String {
    if name.trim().is_empty() {
        return String::new();
    }

    let mut current = name.to_lowercase();
    loop {
        let mut next = strip_parentheticals(&current);
        next = TRAILING_INTEGER.replace(&next, "").into_owned();
        next = TRAILING_ROMAN.replace(&next, "").trim().to_string();

        if next == current {
            return next;
        }
        current = next;
    }
}

// ============================================================================
// Target Matching
// ============================================================================

/// Which pass of the chain produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    /// Case-insensitive full-string equality.
    Exact,
    /// Equality after [`normalize_name`].
    Normalized,
    /// One normalized form contains the other.
    Substring,
    /// Fallback on the upstream-resolved identity and level.
    Reference,
}

/// Run the three text passes over `(index, name)` candidates.
fn match_text<'a, I>(target: &str, candidates: I) -> Option<(usize, MatchPass)>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let target_lower = target.trim().to_lowercase();
    if target_lower.is_empty() {
        return None;
    }

    let candidates: Vec<(usize, &str)> = candidates.into_iter().collect();

    if let Some((index, _)) = candidates
        .iter()
        .find(|(_, name)| name.trim().to_lowercase() == target_lower)
    {
        return Some((*index, MatchPass::Exact));
    }

    let normalized_target = normalize_name(target);
    if normalized_target.is_empty() {
        return None;
    }

    let normalized: Vec<(usize, String)> = candidates
        .iter()
        .map(|(index, name)| (*index, normalize_name(name)))
        .collect();

    if let Some((index, _)) = normalized.iter().find(|(_, name)| *name == normalized_target) {
        return Some((*index, MatchPass::Normalized));
    }

    normalized
        .iter()
        .find(|(_, name)| {
            !name.is_empty()
                && (name.contains(normalized_target.as_str())
                    || normalized_target.contains(name.as_str()))
        })
        .map(|(index, _)| (*index, MatchPass::Substring))
}

/// Index of the candidate `target` resolves to, if any.
pub fn match_target_index<S: AsRef<str>>(target: &str, candidates: &[S]) -> Option<usize> {
    match_text(
        target,
        candidates.iter().enumerate().map(|(i, c)| (i, c.as_ref())),
    )
    .map(|(index, _)| index)
}

/// The candidate `target` resolves to, if any.
///
/// # Examples
///
/// ```rust
/// use class_archetypes::core::archetype::matcher::match_target;
///
/// let names = ["Bravery", "Armor Training 1", "Armor Training 2"];
/// assert_eq!(match_target("armor training 2", &names), Some(&"Armor Training 2"));
/// assert_eq!(match_target("Armor Training", &names), Some(&"Armor Training 1"));
/// assert_eq!(match_target("Weapon Mastery", &names), None);
/// ```
pub fn match_target<'a, S: AsRef<str>>(target: &str, candidates: &'a [S]) -> Option<&'a S> {
    match_target_index(target, candidates).map(|index| &candidates[index])
}

/// Locate the base entry an archetype feature claims, with the pass used.
///
/// Indices in `claimed` are skipped so one base entry is never claimed twice
/// within one diff pass.
pub fn locate_base(
    feature: &ArchetypeFeature,
    expanded_base: &[BaseFeature],
    claimed: &HashSet<usize>,
) -> Option<(usize, MatchPass)> {
    let unclaimed = || {
        expanded_base
            .iter()
            .enumerate()
            .filter(|(index, _)| !claimed.contains(index))
    };

    if let Some(target) = feature.target_text() {
        let by_text = match_text(
            target,
            unclaimed().map(|(index, base)| (index, base.display_name.as_str())),
        );
        if by_text.is_some() {
            return by_text;
        }
    }

    let reference = feature.matched_base.as_ref()?;
    unclaimed()
        .find(|(_, base)| reference.refers_to(base))
        .map(|(index, _)| (index, MatchPass::Reference))
}

/// Index of the base entry an archetype feature claims.
///
/// Text passes run first; when they fail and the parser already resolved an
/// explicit reference, the identity and level of that reference are used.
pub fn find_base_index(
    feature: &ArchetypeFeature,
    expanded_base: &[BaseFeature],
    claimed: &HashSet<usize>,
) -> Option<usize> {
    locate_base(feature, expanded_base, claimed).map(|(index, _)| index)
}
