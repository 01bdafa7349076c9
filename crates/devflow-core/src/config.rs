//! Runtime configuration
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! or missing file yields a working setup.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Widest accepted due-soon window
pub const MAX_DUE_SOON_DAYS: i64 = 365;

/// DevFlow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevflowConfig {
    /// Directory holding the persisted records
    pub storage_dir: PathBuf,
    /// Prefix of the persisted record keys
    pub key_prefix: String,
    /// Width of the "due soon" window in days
    pub due_soon_days: i64,
    /// Damping term added to the workload denominator
    pub workload_damping: u32,
    /// Task suggestion backend
    pub suggest: SuggestConfig,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl DevflowConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storage directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// With record key prefix
    #[inline]
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// With due-soon window
    #[inline]
    #[must_use]
    pub fn with_due_soon_days(mut self, days: i64) -> Self {
        self.due_soon_days = days;
        self
    }

    /// With workload damping term
    #[inline]
    #[must_use]
    pub fn with_workload_damping(mut self, damping: u32) -> Self {
        self.workload_damping = damping;
        self
    }

    /// Parse from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(raw).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0..=MAX_DUE_SOON_DAYS).contains(&self.due_soon_days) {
            return Err(CoreError::Config(format!(
                "due_soon_days must be within 0..={MAX_DUE_SOON_DAYS}, got {}",
                self.due_soon_days
            )));
        }
        Ok(())
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(CoreError::Config(format!("{}: {e}", path.display()))),
        }
    }
}

impl Default for DevflowConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".devflow"),
            key_prefix: devflow_storage::DEFAULT_KEY_PREFIX.to_string(),
            due_soon_days: 3,
            workload_damping: 5,
            suggest: SuggestConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// Task suggestion backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// API base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl SuggestConfig {
    /// API key from the configured environment variable
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "DEVFLOW_GEMINI_API_KEY".to_string(),
        }
    }
}
