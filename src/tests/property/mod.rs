//! Property-based tests for the archetype engine
//!
//! This module contains property-based tests using the proptest framework.
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! Run all property tests:
//! ```sh
//! cargo test property --release
//! ```
//!
//! Run a specific property test module:
//! ```sh
//! cargo test property::diff_props --release
//! ```
//!
//! ## Test Modules
//!
//! - `matcher_props`: Tests for name normalization and target matching
//!   - Normalizing a normalized name is a no-op
//!   - Normalized names are lowercase and trimmed
//!   - Every name matches itself
//!
//! - `scalable_props`: Tests for the scalable series registry
//!   - Series conflict checks are order-independent
//!   - Splitting a known series yields one entry per tier at registry levels
//!   - Every split tier keeps the original identity
//!
//! - `diff_props`: Tests for the diff engine
//!   - Unchanged and Removed rows partition the expanded base list
//!   - Every archetype feature yields exactly one Added or Modified row
//!   - Output is sorted by level
//!   - Identical inputs give identical outputs
//!
//! - `conflict_props`: Tests for stacking validation
//!   - Every subset of a valid stack is valid
//!   - An archetype stacked with itself conflicts
//!   - Cumulative replacements count every targeting feature
//!
//! ## Property Testing Philosophy
//!
//! Property-based testing helps find edge cases that manual test cases might miss.
//! The proptest framework will:
//!
//! 1. Generate random inputs based on defined strategies
//! 2. Test each property with many different inputs
//! 3. If a failure is found, shrink the input to find the minimal failing case
//! 4. Store failing cases in a regression file for future testing
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod conflict_props;
mod diff_props;
mod matcher_props;
mod scalable_props;
mod strategies;
