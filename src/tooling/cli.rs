//! CLI Tooling
//!
//! Command-line surface over the import, sync, and component services. Every
//! command returns its rendered output so the binary only has to print it.

use super::format::{
    format_component, format_component_list, format_import_report, format_sync_report,
    OutputFormat,
};
use crate::cache::ComponentCache;
use crate::component::service::{ComponentPatch, ComponentService};
use crate::component::{ComponentDraft, ComponentKind};
use crate::config::SwitchboardConfig;
use crate::error::ApiError;
use crate::import::ImportOrchestrator;
use crate::store::persistence::SledComponentStore;
use crate::store::ComponentStore;
use crate::sync::SyncOrchestrator;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Switchboard CLI - import, store, and sync agent configuration
#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Import, store, and sync agent configuration for an installation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Component store directory (overrides storage.store_path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply the logging flags on top of the loaded configuration.
    pub fn apply_logging_overrides(&self, config: &mut SwitchboardConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import an installation's configuration into the store
    Import {
        /// Installation root to read from
        source: PathBuf,
        /// Parse and validate only; write nothing
        #[arg(long)]
        dry_run: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Write stored configuration back into an installation
    Sync {
        /// Installation root to write to
        target: PathBuf,
        /// List the files that would be written
        #[arg(long)]
        dry_run: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Manage stored components
    Component {
        #[command(subcommand)]
        command: ComponentCommands,
    },
}

#[derive(Subcommand)]
pub enum ComponentCommands {
    /// List components
    List {
        /// Only list components of this kind
        #[arg(long)]
        kind: Option<ComponentKind>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show one component with its payload
    Show {
        kind: ComponentKind,
        name: String,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Create a component from a JSON payload file
    Create {
        kind: ComponentKind,
        name: String,
        /// JSON file holding the payload
        #[arg(long)]
        config_file: PathBuf,
        #[arg(long)]
        description: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Update a component; payload keys in the file replace stored keys
    Update {
        kind: ComponentKind,
        name: String,
        /// JSON object whose top-level keys are merged into the payload
        #[arg(long)]
        config_file: Option<PathBuf>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
    },
    /// Delete a component
    Delete { kind: ComponentKind, name: String },
}

/// Services shared by every command.
pub struct CliContext {
    components: ComponentService,
    importer: ImportOrchestrator,
    syncer: SyncOrchestrator,
}

impl CliContext {
    /// Validate `config` and open the store it names.
    pub fn from_config(
        mut config: SwitchboardConfig,
        store_override: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        if store_override.is_some() {
            config.storage.store_path = store_override;
        }
        config.validate()?;

        let store_path = config.storage.resolve_store_path()?;
        debug!(store = %store_path.display(), "Opening component store");
        let store: Arc<dyn ComponentStore> = Arc::new(SledComponentStore::open(&store_path)?);
        let cache = Arc::new(ComponentCache::new(store.clone(), config.cache.ttl()));

        Ok(Self {
            components: ComponentService::new(store.clone()),
            importer: ImportOrchestrator::new(
                store,
                config.layout.clone(),
                config.import.clone(),
            ),
            syncer: SyncOrchestrator::new(
                cache,
                config.layout.clone(),
                config.sync.clone(),
                config.import.project_name.clone(),
            ),
        })
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Import {
                source,
                dry_run,
                format,
            } => {
                info!(source = %source.display(), dry_run, "Running import");
                let report = self.importer.import(source, *dry_run).await?;
                format_import_report(&report, *format)
            }
            Commands::Sync {
                target,
                dry_run,
                format,
            } => {
                info!(target = %target.display(), dry_run, "Running sync");
                let report = self.syncer.sync(target, *dry_run).await?;
                format_sync_report(&report, *format)
            }
            Commands::Component { command } => self.execute_component(command).await,
        }
    }

    async fn execute_component(&self, command: &ComponentCommands) -> Result<String, ApiError> {
        match command {
            ComponentCommands::List { kind, format } => {
                let components = self.components.list(*kind).await?;
                format_component_list(&components, *format)
            }
            ComponentCommands::Show { kind, name, format } => {
                let component = self.components.get(*kind, name).await?;
                format_component(&component, *format)
            }
            ComponentCommands::Create {
                kind,
                name,
                config_file,
                description,
                tags,
            } => {
                let payload = read_payload(config_file).await?;
                let mut draft = ComponentDraft::new(*kind, name.clone(), payload);
                if let Some(d) = description {
                    draft = draft.with_description(d.clone());
                }
                draft.tags = tags.clone();
                let record = self.components.create(draft).await?;
                Ok(format!("Created {} '{}'.", record.kind, record.name))
            }
            ComponentCommands::Update {
                kind,
                name,
                config_file,
                description,
                enabled,
            } => {
                let config = match config_file {
                    Some(path) => match read_payload(path).await? {
                        serde_json::Value::Object(map) => Some(map),
                        _ => {
                            return Err(ApiError::ConfigError(format!(
                                "{} must contain a JSON object",
                                path.display()
                            )))
                        }
                    },
                    None => None,
                };
                let patch = ComponentPatch {
                    description: description.clone(),
                    enabled: *enabled,
                    config,
                    ..ComponentPatch::default()
                };
                let record = self.components.update(*kind, name, patch).await?;
                Ok(format!("Updated {} '{}'.", record.kind, record.name))
            }
            ComponentCommands::Delete { kind, name } => {
                self.components.delete(*kind, name).await?;
                Ok(format!("Deleted {} '{}'.", kind, name))
            }
        }
    }
}

async fn read_payload(path: &Path) -> Result<serde_json::Value, ApiError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        ApiError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text)
        .map_err(|e| ApiError::ConfigError(format!("{} is not valid JSON: {}", path.display(), e)))
}
