use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::archetype::{DiffEngine, Result, ScalableRegistry, SeriesDefinition};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub registry: RegistryConfig,
    pub diff: DiffConfig,
}

/// Scalable series registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Start from the built-in series table.
    pub include_builtin: bool,
    /// Extra series; a (class, base name) already built in is overridden.
    pub series: Vec<SeriesDefinition>,
}

/// Diff engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Split condensed series into tiers when an archetype targets a tier.
    pub expand_series: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            series: Vec::new(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { expand_series: true }
    }
}

impl EngineConfig {
    /// Load configuration from `<config dir>/class-archetypes/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if !config_path.exists() {
            log::debug!("No config file at {}, using defaults", config_path.display());
            return Self::default();
        }

        match Self::from_path(&config_path) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to load config at {}: {e}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validate the configured series and assemble the registry.
    pub fn build_registry(&self) -> Result<ScalableRegistry> {
        ScalableRegistry::from_definitions(self.registry.include_builtin, &self.registry.series)
    }

    /// Diff engine over `registry` with this configuration's settings.
    pub fn diff_engine<'r>(&self, registry: &'r ScalableRegistry) -> DiffEngine<'r> {
        DiffEngine::new(registry).with_series_expansion(self.diff.expand_series)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("class-archetypes").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
