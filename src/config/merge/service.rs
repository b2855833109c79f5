//! MergeService: orchestrates sources, applies precedence, deserializes to SwitchboardConfig.

use crate::config::sources::{environment, global_file};
use crate::config::SwitchboardConfig;
use config::{Config, ConfigError, File};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    /// Precedence: struct defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<SwitchboardConfig, ConfigError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config with an explicit file layered over the global file. The explicit
    /// file must exist; environment still wins.
    pub fn load_from_file(path: &Path) -> Result<SwitchboardConfig, ConfigError> {
        let builder = global_file::add_to_builder(Config::builder())?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
