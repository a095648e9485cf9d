//! Service configuration
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! memoize_resolution = true
//! intern_immutables = true
//! intern_initial_capacity = 256
//! log_filter = "info,propdata_processor=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but make no sense
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Data service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Memoize processor resolution per (host kind, key)
    pub memoize_resolution: bool,
    /// Share immutable values and bundles through the interning cache
    pub intern_immutables: bool,
    /// Initial capacity of each interning table
    pub intern_initial_capacity: usize,
    /// `tracing` filter directive used by binaries
    pub log_filter: String,
}

impl DataConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With resolution memoization on or off
    #[inline]
    #[must_use]
    pub fn with_memoize_resolution(mut self, memoize: bool) -> Self {
        self.memoize_resolution = memoize;
        self
    }

    /// With interning on or off
    #[inline]
    #[must_use]
    pub fn with_intern_immutables(mut self, intern: bool) -> Self {
        self.intern_immutables = intern;
        self
    }

    /// With initial interning table capacity
    #[inline]
    #[must_use]
    pub fn with_intern_initial_capacity(mut self, capacity: usize) -> Self {
        self.intern_initial_capacity = capacity;
        self
    }

    /// With log filter directive
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// `Parse` for malformed TOML or unknown fields, `Invalid` when
    /// validation fails.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Check values that parse but are unusable
    ///
    /// # Errors
    /// `Invalid` for a zero interning capacity or an empty log filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intern_initial_capacity == 0 {
            return Err(ConfigError::Invalid(
                "intern_initial_capacity must be positive".to_string(),
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            memoize_resolution: true,
            intern_immutables: true,
            intern_initial_capacity: propdata_cache::DEFAULT_INITIAL_CAPACITY,
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DataConfig::from_toml_str("").unwrap(), DataConfig::default());
    }

    #[test]
    fn partial_document_overrides() {
        let config = DataConfig::from_toml_str("memoize_resolution = false\n").unwrap();
        assert!(!config.memoize_resolution);
        assert!(config.intern_immutables);
        assert_eq!(config.intern_initial_capacity, 256);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = DataConfig::from_toml_str("memoise = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let err = DataConfig::from_toml_str("intern_initial_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn builder_methods() {
        let config = DataConfig::new()
            .with_memoize_resolution(false)
            .with_intern_immutables(false)
            .with_intern_initial_capacity(16)
            .with_log_filter("debug");
        assert!(!config.memoize_resolution);
        assert!(!config.intern_immutables);
        assert_eq!(config.intern_initial_capacity, 16);
        assert_eq!(config.log_filter, "debug");
    }
}
