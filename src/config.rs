//! Listing configuration
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! [database]
//! backend = "mysql"
//!
//! [query_builder]
//! legacy_compatibility = false
//! default_columns = ["*"]
//! ```
//!
//! Every field is optional. `LISTING_DB_BACKEND` and
//! `LISTING_LEGACY_QUERY_BUILDER` override the file when
//! [`ListingConfig::apply_env_overrides`] is called.

use crate::error::{Error, Result};
use crate::query_builder::DatabaseBackend;
use serde::{Deserialize, Serialize};
use std::env;

#[cfg(feature = "config")]
use std::fs;
#[cfg(feature = "config")]
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ListingConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub query_builder: QueryBuilderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryBuilderConfig {
    /// Build listing queries with the legacy-compatible backend
    #[serde(default)]
    pub legacy_compatibility: bool,

    /// Columns selected when a listing does not name any
    #[serde(default = "default_columns")]
    pub default_columns: Vec<String>,
}

impl Default for QueryBuilderConfig {
    fn default() -> Self {
        Self {
            legacy_compatibility: false,
            default_columns: default_columns(),
        }
    }
}

fn default_columns() -> Vec<String> {
    vec!["*".to_string()]
}

impl ListingConfig {
    /// Parse configuration from a TOML string
    #[cfg(feature = "config")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: ListingConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse listing config: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    /// Load configuration from a TOML file
    #[cfg(feature = "config")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = fs::read_to_string(path_ref)?;

        let config = Self::from_toml_str(&content).map_err(|e| {
            Error::config(format!("Invalid config file '{}': {}", path_ref.display(), e))
        })?;

        log::debug!("Loaded listing configuration from {}", path_ref.display());
        Ok(config)
    }

    /// Apply `LISTING_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(backend) = env::var("LISTING_DB_BACKEND") {
            self.database.backend = DatabaseBackend::parse(&backend)
                .ok_or_else(|| Error::config(format!("Invalid LISTING_DB_BACKEND value '{}'", backend)))?;
        }
        if let Ok(legacy) = env::var("LISTING_LEGACY_QUERY_BUILDER") {
            self.query_builder.legacy_compatibility = parse_flag(&legacy).ok_or_else(|| {
                Error::config(format!("Invalid LISTING_LEGACY_QUERY_BUILDER value '{}'", legacy))
            })?;
        }
        Ok(())
    }

    // An explicitly empty column list still has to select something
    #[cfg(feature = "config")]
    fn normalize(&mut self) {
        if self.query_builder.default_columns.is_empty() {
            self.query_builder.default_columns = default_columns();
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
