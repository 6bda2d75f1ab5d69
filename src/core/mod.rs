
pub mod logging;

// Archetype overlay engine: matching, scalable series, diffing, stacking
pub mod archetype;
