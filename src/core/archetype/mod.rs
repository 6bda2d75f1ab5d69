//! Archetype Overlay Engine
//!
//! Archetypes are alternate builds of a base class. Each one swaps out,
//! alters or adds to the class's native feature sequence. This module
//! computes the resulting sequence and decides which archetypes can be
//! stacked together on one character.
//!
//! # Overview
//!
//! This module provides:
//!
//! - **Core Data Models**: [`BaseFeature`], [`ArchetypeFeature`], [`ParsedArchetype`],
//!   [`DiffEntry`]
//! - **Name Matching**: Exact -> Normalized -> Substring -> Identity reference
//! - **Scalable Series**: Condensed features such as "Weapon Training" split into numbered tiers
//! - **Diffing**: Base sequence vs. one archetype or an ordered stack of them
//! - **Stacking**: Pairwise conflict detection and incremental add/remove checks
//! - **Resolution**: Ordered strategies that classify raw archetype features
//!
//! # Architecture
//!
//! ```text
//!                     +---------------------------+
//!                     |     ScalableRegistry      |
//!                     |  (immutable series table) |
//!                     +---------------------------+
//!                                |
//!                +---------------+---------------+
//!                |                               |
//!                v                               v
//!        +---------------+               +----------------+
//!        |  DiffEngine   |               | StackValidator |
//!        |               |               |                |
//!        +---------------+               +----------------+
//!                |                               |
//!                +------------ matcher ----------+
//! ```
//!
//! Every operation is synchronous and reads its inputs without mutating
//! them. The registry is built once and then shared by reference.
//!
//! # Usage Examples
//!
//! ## Diffing an Archetype
//!
//! ```rust
//! use class_archetypes::core::archetype::prelude::*;
//!
//! let base = vec![
//!     BaseFeature::new("bravery", 2, "Bravery"),
//!     BaseFeature::new("weapon-training", 5, "Weapon Training"),
//! ];
//! let archetype = ParsedArchetype::new("Weapon Master", "fighter")
//!     .with_feature(ArchetypeFeature::replacing("Weapon Guard", "Weapon Training 1"));
//!
//! let diff = DiffEngine::builtin().diff(&base, &archetype, Some("fighter"));
//! let summary = summarize(&diff);
//! assert_eq!(summary.removed, 1);
//! assert_eq!(summary.added, 1);
//! ```
//!
//! ## Validating a Stack
//!
//! ```rust
//! use class_archetypes::core::archetype::prelude::*;
//!
//! let a = ParsedArchetype::new("Lore Warden", "fighter")
//!     .with_feature(ArchetypeFeature::replacing("Expertise", "Bravery"));
//! let b = ParsedArchetype::new("Phalanx Soldier", "fighter")
//!     .with_feature(ArchetypeFeature::replacing("Stand Firm", "Bravery (Ex)"));
//!
//! let validation = StackValidator::builtin().validate_stack(&[a, b]);
//! assert!(!validation.valid);
//! ```
//!
//! # Module Structure
//!
//! - [`error`]: Error types for registry construction and document decoding
//! - [`types`]: Core data models
//! - [`matcher`]: Name normalization and target matching
//! - [`scalable`]: Scalable feature series registry
//! - [`diff`]: Base-vs-archetype diffing
//! - [`conflict`]: Conflict detection and stacking validation
//! - [`resolution`]: Feature classification strategies

// ============================================================================
// Module Declarations
// ============================================================================

pub mod conflict;
pub mod diff;
pub mod error;
pub mod matcher;
pub mod resolution;
pub mod scalable;
pub mod types;

// ============================================================================
// Re-exports: Error Types
// ============================================================================

pub use error::{ArchetypeError, Result};

// ============================================================================
// Re-exports: Core Types
// ============================================================================

pub use types::{
    slugify,
    ArchetypeFeature,
    BaseFeature,
    BaseFeatureRef,
    ClassDescriptor,
    Conflict,
    DiffEntry,
    DiffStatus,
    FeatureId,
    FeatureKind,
    ParsedArchetype,
    ResolutionSource,
    SplitTier,
};

// ============================================================================
// Re-exports: Matching
// ============================================================================

pub use matcher::{
    find_base_index,
    locate_base,
    match_target,
    match_target_index,
    normalize_name,
    MatchPass,
};

// ============================================================================
// Re-exports: Scalable Series
// ============================================================================

pub use scalable::{
    ScalableRegistry,
    ScalableSeries,
    SeriesConflict,
    SeriesDefinition,
    SeriesTier,
    TargetParse,
};

// ============================================================================
// Re-exports: Diff Engine
// ============================================================================

pub use diff::{retained_entries, summarize, DiffEngine, DiffSummary};

// ============================================================================
// Re-exports: Stacking
// ============================================================================

pub use conflict::{
    get_cumulative_replacements,
    validate_class,
    ApplyCheck,
    ConflictPair,
    CumulativeReplacements,
    ReplacementEntry,
    StackAddition,
    StackRemoval,
    StackValidation,
    StackValidator,
};

// ============================================================================
// Re-exports: Resolution
// ============================================================================

pub use resolution::{
    ManualFixes,
    RawFeature,
    ResolutionChain,
    ResolutionStrategy,
    ResolvedFeatures,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient imports for common archetype operations.
///
/// ```rust
/// use class_archetypes::core::archetype::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Core types
        ArchetypeFeature,
        BaseFeature,
        BaseFeatureRef,
        ClassDescriptor,
        Conflict,
        DiffEntry,
        DiffStatus,
        FeatureKind,
        ParsedArchetype,

        // Engines
        DiffEngine,
        ScalableRegistry,
        StackValidator,

        // Helpers
        normalize_name,
        match_target,
        retained_entries,
        summarize,
        get_cumulative_replacements,
        validate_class,

        // Resolution
        ManualFixes,
        RawFeature,
        ResolutionChain,
        ResolutionStrategy,

        // Errors
        ArchetypeError,
        Result,
    };
}

// ============================================================================
// Module Tests
// ============================================================================
