/// Class Archetypes - Archetype overlay engine for TTRPG class features
///
/// Core library computing how archetypes reshape a base class's feature
/// sequence, splitting scalable feature series into tiers, and validating
/// which archetypes can be stacked together.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
