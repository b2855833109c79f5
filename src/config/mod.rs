//! Configuration
//!
//! Layered configuration for the store, cache, import, and sync pipelines. Every
//! section is fully defaulted so an empty source set yields a working config.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

impl SwitchboardConfig {
    /// Check cross-field constraints the type system cannot express.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.cache.ttl_ms == 0 {
            return Err(ApiError::ConfigError(
                "cache.ttl_ms must be greater than zero".to_string(),
            ));
        }
        self.sync.validate()?;
        if self.import.project_name.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "import.project_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the component store; None means `$XDG_DATA_HOME/switchboard/store`
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the store location, falling back to the XDG data directory.
    pub fn resolve_store_path(&self) -> Result<PathBuf, ApiError> {
        match &self.store_path {
            Some(p) if !p.as_os_str().is_empty() => Ok(p.clone()),
            _ => Ok(xdg::app_data_dir()?.join("store")),
        }
    }
}

/// Component cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_cache_ttl_ms() -> u64 {
    30_000
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_cache_ttl_ms(),
        }
    }
}

/// Import pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Soft latency budget; overruns are reported as warnings
    #[serde(default = "default_import_budget_ms")]
    pub latency_budget_ms: u64,

    /// Name under which the imported project config is stored
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Name of the dictionary assignment in the models source file
    #[serde(default = "default_assignment_name")]
    pub assignment_name: String,
}

fn default_import_budget_ms() -> u64 {
    10_000
}

fn default_project_name() -> String {
    "default".to_string()
}

fn default_assignment_name() -> String {
    "AGENT_CONFIGS".to_string()
}

impl ImportConfig {
    pub fn latency_budget(&self) -> Duration {
        Duration::from_millis(self.latency_budget_ms)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            latency_budget_ms: default_import_budget_ms(),
            project_name: default_project_name(),
            assignment_name: default_assignment_name(),
        }
    }
}

/// Sync pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_budget_ms")]
    pub latency_budget_ms: u64,

    /// Upper bound on simultaneous file writes
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Floor applied when memory pressure reduces concurrency
    #[serde(default = "default_min_concurrency")]
    pub min_concurrency: usize,

    /// Amount subtracted from the base concurrency under memory pressure
    #[serde(default = "default_concurrency_step_down")]
    pub concurrency_step_down: usize,

    /// Used/total memory ratio above which concurrency is reduced
    #[serde(default = "default_memory_threshold")]
    pub memory_threshold: f64,

    /// File count above which batches are separated by a pause
    #[serde(default = "default_large_batch_threshold")]
    pub large_batch_threshold: usize,

    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

fn default_sync_budget_ms() -> u64 {
    5_000
}

fn default_max_concurrency() -> usize {
    10
}

fn default_min_concurrency() -> usize {
    3
}

fn default_concurrency_step_down() -> usize {
    3
}

fn default_memory_threshold() -> f64 {
    0.85
}

fn default_large_batch_threshold() -> usize {
    50
}

fn default_batch_pause_ms() -> u64 {
    10
}

impl SyncConfig {
    pub fn latency_budget(&self) -> Duration {
        Duration::from_millis(self.latency_budget_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.max_concurrency == 0 {
            return Err(ApiError::ConfigError(
                "sync.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.min_concurrency == 0 || self.min_concurrency > self.max_concurrency {
            return Err(ApiError::ConfigError(format!(
                "sync.min_concurrency must be between 1 and max_concurrency ({})",
                self.max_concurrency
            )));
        }
        if !(0.0..=1.0).contains(&self.memory_threshold) {
            return Err(ApiError::ConfigError(format!(
                "sync.memory_threshold must be within 0.0..=1.0, got {}",
                self.memory_threshold
            )));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            latency_budget_ms: default_sync_budget_ms(),
            max_concurrency: default_max_concurrency(),
            min_concurrency: default_min_concurrency(),
            concurrency_step_down: default_concurrency_step_down(),
            memory_threshold: default_memory_threshold(),
            large_batch_threshold: default_large_batch_threshold(),
            batch_pause_ms: default_batch_pause_ms(),
        }
    }
}

/// Relative locations of the artifacts inside an installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_models_file")]
    pub models_file: PathBuf,

    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,

    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,

    #[serde(default = "default_phase_metadata_file")]
    pub phase_metadata_file: PathBuf,

    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
}

fn default_models_file() -> PathBuf {
    PathBuf::from("agents/models.py")
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

fn default_settings_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_phase_metadata_file() -> PathBuf {
    PathBuf::from("task_metadata.json")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("agent_configs.json")
}

impl LayoutConfig {
    pub fn models_path(&self, root: &Path) -> PathBuf {
        root.join(&self.models_file)
    }

    pub fn prompts_path(&self, root: &Path) -> PathBuf {
        root.join(&self.prompts_dir)
    }

    pub fn settings_path(&self, root: &Path) -> PathBuf {
        root.join(&self.settings_file)
    }

    pub fn phase_metadata_path(&self, root: &Path) -> PathBuf {
        root.join(&self.phase_metadata_file)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            models_file: default_models_file(),
            prompts_dir: default_prompts_dir(),
            settings_file: default_settings_file(),
            phase_metadata_file: default_phase_metadata_file(),
            manifest_file: default_manifest_file(),
        }
    }
}
