//! Search configuration loaded from TOML.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SERVICE_SEARCH_CONFIG";

/// Defaults the compiler and ordering fall back to when a request omits a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius used when a location is given without an explicit distance
    pub default_search_distance_miles: u32,
    /// Page size used when a request omits `per_page`
    pub default_pagination_results: u32,
    /// Upper bound for `per_page`
    pub max_pagination_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_search_distance_miles: 15,
            default_pagination_results: 25,
            max_pagination_results: 100,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Resolve the config using the lookup order:
    /// explicit path, `SERVICE_SEARCH_CONFIG`, the user config directory, then defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }

        if let Some(path) = default_config_path()
            && path.is_file()
        {
            tracing::debug!("Using config from {}", path.display());
            return Self::load(&path);
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_search_distance_miles == 0 {
            return Err(ConfigError::Invalid(
                "default_search_distance_miles must be at least 1".to_string(),
            ));
        }
        if self.max_pagination_results == 0 {
            return Err(ConfigError::Invalid(
                "max_pagination_results must be at least 1".to_string(),
            ));
        }
        if self.default_pagination_results == 0 {
            return Err(ConfigError::Invalid(
                "default_pagination_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config_dir>/service-search/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("service-search").join("config.toml"))
}
