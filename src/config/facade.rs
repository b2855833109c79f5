//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SwitchboardConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<SwitchboardConfig, ConfigError> {
        MergeService::load()
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<SwitchboardConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Load from an explicit file when given, otherwise from the standard sources.
    pub fn load_with_override(path: Option<&Path>) -> Result<SwitchboardConfig, ConfigError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Self::load(),
        }
    }

    /// Create default configuration.
    pub fn default() -> SwitchboardConfig {
        SwitchboardConfig::default()
    }
}
