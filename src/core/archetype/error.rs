//! Error types for the archetype engine.
//!
//! The feature-resolution core never fails on domain conditions: unknown
//! classes, unresolvable targets and conflicting stacks are all reported as
//! data. The variants here cover the surfaces around it: building a registry
//! from configured series, decoding archetype documents and reading
//! configuration files.

use thiserror::Error;

/// Result type alias for archetype operations.
pub type Result<T> = std::result::Result<T, ArchetypeError>;

/// Error enum for archetype engine operations.
#[derive(Error, Debug)]
pub enum ArchetypeError {
    // =========================================================================
    // Registry Errors
    // =========================================================================

    /// A configured scalable series failed validation.
    #[error("Invalid scalable series '{base_name}': {reason}")]
    InvalidSeries {
        /// Base name of the offending series
        base_name: String,
        /// Description of what made the series invalid
        reason: String,
    },

    /// The same (class, base name) pair was defined twice in one configuration.
    #[error("Duplicate scalable series '{base_name}' for class '{class}'")]
    DuplicateSeries {
        /// Class key the series was registered under
        class: String,
        /// Normalized base name of the series
        base_name: String,
    },

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML configuration parse error.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
