//! Import Orchestrator
//!
//! Reads an installation's artifacts, validates every recovered entity, and writes
//! the whole batch in one store transaction. Validation is all-or-nothing: a
//! single invalid entity means nothing is written.

use crate::component::validation::validate_batch;
use crate::component::{ComponentDraft, ComponentKind, TypedComponent};
use crate::config::{ImportConfig, LayoutConfig};
use crate::error::{ApiError, ParseError};
use crate::instrument::LatencyBudget;
use crate::parsers::{env_settings, models_source, phase_metadata, prompts_dir};
use crate::store::{ComponentStore, UpsertOutcome};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entities per kind in an import batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCounts {
    pub agent_configs: usize,
    pub prompts: usize,
    pub model_profiles: usize,
    pub project_configs: usize,
}

impl ImportCounts {
    fn record(&mut self, kind: ComponentKind) {
        match kind {
            ComponentKind::AgentConfig => self.agent_configs += 1,
            ComponentKind::Prompt => self.prompts += 1,
            ComponentKind::ModelProfile => self.model_profiles += 1,
            ComponentKind::ProjectConfig => self.project_configs += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.agent_configs + self.prompts + self.model_profiles + self.project_configs
    }
}

/// Result of an import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub dry_run: bool,
    pub counts: ImportCounts,
    /// Entities whose stored form already matched the source
    pub unchanged: usize,
    /// Parse problems; the affected entries were skipped
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// A named, typed entity recovered from the source.
struct Candidate {
    name: String,
    typed: TypedComponent,
}

pub struct ImportOrchestrator {
    store: Arc<dyn ComponentStore>,
    layout: LayoutConfig,
    config: ImportConfig,
}

impl ImportOrchestrator {
    pub fn new(store: Arc<dyn ComponentStore>, layout: LayoutConfig, config: ImportConfig) -> Self {
        Self {
            store,
            layout,
            config,
        }
    }

    /// Import the installation rooted at `source`.
    pub async fn import(&self, source: &Path, dry_run: bool) -> Result<ImportReport, ApiError> {
        let budget = LatencyBudget::new("import", self.config.latency_budget());
        let timed = budget.measure(self.run(source, dry_run)).await;
        let mut report = timed.value?;
        report.warnings.extend(timed.warning);
        info!(
            source = %source.display(),
            dry_run,
            total = report.counts.total(),
            unchanged = report.unchanged,
            parse_errors = report.errors.len(),
            elapsed_ms = timed.elapsed.as_millis() as u64,
            "Import finished"
        );
        Ok(report)
    }

    async fn run(&self, source: &Path, dry_run: bool) -> Result<ImportReport, ApiError> {
        self.check_preconditions(source).await?;

        let mut warnings = Vec::new();
        let parsed = self.stage("import.parse").measure(self.parse_all(source)).await;
        warnings.extend(parsed.warning);
        let (candidates, errors) = parsed.value;
        debug!(
            candidates = candidates.len(),
            parse_errors = errors.len(),
            "Parsed import sources"
        );

        let validated = self.stage("import.validate").measure(self.validate(&candidates)).await;
        warnings.extend(validated.warning);
        let validation_errors = validated.value?;
        if !validation_errors.is_empty() {
            warn!(
                errors = validation_errors.len(),
                "Import rejected; nothing was written"
            );
            return Err(ApiError::ValidationFailed(validation_errors));
        }

        let mut counts = ImportCounts::default();
        for c in &candidates {
            counts.record(c.typed.kind());
        }

        if dry_run {
            return Ok(ImportReport {
                dry_run: true,
                counts,
                unchanged: 0,
                errors,
                warnings,
            });
        }

        let drafts = candidates
            .iter()
            .map(|c| ComponentDraft::from_typed(&c.typed).map(|d| ComponentDraft { name: c.name.clone(), ..d }))
            .collect::<Result<Vec<_>, _>>()?;

        let stored = self
            .stage("import.store")
            .measure(self.store.upsert_batch(&drafts, Utc::now()))
            .await;
        warnings.extend(stored.warning);
        let results = stored.value?;
        debug!(items = results.len(), "Stored import batch");

        Ok(ImportReport {
            dry_run: false,
            counts,
            unchanged: results
                .iter()
                .filter(|r| r.outcome == UpsertOutcome::Unchanged)
                .count(),
            errors,
            warnings,
        })
    }

    fn stage(&self, label: &str) -> LatencyBudget {
        LatencyBudget::new(label, self.config.latency_budget())
    }

    async fn check_preconditions(&self, source: &Path) -> Result<(), ApiError> {
        if !is_dir(source).await {
            return Err(ApiError::ConfigError(format!(
                "Source path {} is not an existing directory",
                source.display()
            )));
        }
        let models = self.layout.models_path(source);
        if !tokio::fs::try_exists(&models).await.unwrap_or(false) {
            return Err(ApiError::ConfigError(format!(
                "Models source file not found: {}",
                models.display()
            )));
        }
        let prompts = self.layout.prompts_path(source);
        if !is_dir(&prompts).await {
            return Err(ApiError::ConfigError(format!(
                "Prompts directory not found: {}",
                prompts.display()
            )));
        }
        Ok(())
    }

    /// Run every parser concurrently and gather candidates and parse errors.
    async fn parse_all(&self, source: &Path) -> (Vec<Candidate>, Vec<String>) {
        let models_path = self.layout.models_path(source);
        let prompts_path = self.layout.prompts_path(source);
        let settings_path = self.layout.settings_path(source);
        let metadata_path = self.layout.phase_metadata_path(source);

        let settings = async {
            if tokio::fs::try_exists(&settings_path).await.unwrap_or(false) {
                env_settings::parse_file(&settings_path).await.map(Some)
            } else {
                Ok(None)
            }
        };

        let (models, prompts, settings, profile) = tokio::join!(
            models_source::parse_file(&models_path, &self.config.assignment_name),
            prompts_dir::parse_dir(&prompts_path),
            settings,
            phase_metadata::parse_file(&metadata_path),
        );

        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        let file_error = |e: ParseError| {
            warn!(error = %e, "Skipping unreadable source");
            e.to_string()
        };

        match models {
            Ok(out) => {
                errors.extend(out.errors.into_iter().map(|e| format!("models: {}", e)));
                candidates.extend(out.items.into_iter().map(|c| Candidate {
                    name: c.agent_type.clone(),
                    typed: TypedComponent::AgentConfig(c),
                }));
            }
            Err(e) => errors.push(file_error(e)),
        }
        match prompts {
            Ok(out) => {
                errors.extend(out.errors.into_iter().map(|e| format!("prompts: {}", e)));
                candidates.extend(out.items.into_iter().map(|p| Candidate {
                    name: p.agent_type.clone(),
                    typed: TypedComponent::Prompt(p),
                }));
            }
            Err(e) => errors.push(file_error(e)),
        }
        match profile {
            Ok(Some(p)) => candidates.push(Candidate {
                name: p.name.clone(),
                typed: TypedComponent::ModelProfile(p),
            }),
            Ok(None) => {}
            Err(e) => errors.push(file_error(e)),
        }
        match settings {
            Ok(Some(out)) => {
                errors.extend(out.errors.into_iter().map(|e| format!("settings: {}", e)));
                candidates.push(Candidate {
                    name: self.config.project_name.clone(),
                    typed: TypedComponent::ProjectConfig(out.config),
                });
            }
            Ok(None) => {}
            Err(e) => errors.push(file_error(e)),
        }

        (candidates, errors)
    }

    /// Schema checks for every candidate plus the project's profile reference.
    async fn validate(&self, candidates: &[Candidate]) -> Result<Vec<String>, ApiError> {
        let mut errors = validate_batch(candidates.iter().map(|c| (c.name.as_str(), &c.typed)));

        let batch_profiles: HashSet<&str> = candidates
            .iter()
            .filter_map(|c| match &c.typed {
                TypedComponent::ModelProfile(p) => Some(p.name.as_str()),
                _ => None,
            })
            .collect();
        for candidate in candidates {
            let TypedComponent::ProjectConfig(project) = &candidate.typed else {
                continue;
            };
            let Some(profile) = project.model_profile.as_deref() else {
                continue;
            };
            if batch_profiles.contains(profile) {
                continue;
            }
            if self.store.get(ComponentKind::ModelProfile, profile).await?.is_none() {
                errors.push(format!(
                    "project_config '{}': references unknown model_profile '{}'",
                    candidate.name, profile
                ));
            }
        }
        Ok(errors)
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SledComponentStore;
    use std::fs;
    use tempfile::TempDir;

    fn orchestrator(store: Arc<SledComponentStore>) -> ImportOrchestrator {
        ImportOrchestrator::new(store, LayoutConfig::default(), ImportConfig::default())
    }

    fn write_install(root: &Path) {
        fs::create_dir_all(root.join("agents")).unwrap();
        fs::create_dir_all(root.join("prompts")).unwrap();
        fs::write(
            root.join("agents/models.py"),
            r#"AGENT_CONFIGS = {
    "coder": {"tools": ["Read", "Write"], "mcp_servers": ["context7"]},
}"#,
        )
        .unwrap();
        fs::write(root.join("prompts/coder.md"), "Implement one subtask at a time.").unwrap();
    }

    #[tokio::test]
    async fn test_missing_source_is_config_error() {
        let store = Arc::new(SledComponentStore::temporary().unwrap());
        let dir = TempDir::new().unwrap();
        let err = orchestrator(store)
            .import(&dir.path().join("absent"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_missing_prompts_dir_is_config_error() {
        let store = Arc::new(SledComponentStore::temporary().unwrap());
        let dir = TempDir::new().unwrap();
        write_install(dir.path());
        fs::remove_dir_all(dir.path().join("prompts")).unwrap();
        let err = orchestrator(store).import(dir.path(), false).await.unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_import_without_settings_or_metadata() {
        let store = Arc::new(SledComponentStore::temporary().unwrap());
        let dir = TempDir::new().unwrap();
        write_install(dir.path());

        let report = orchestrator(store.clone()).import(dir.path(), false).await.unwrap();
        assert_eq!(report.counts.agent_configs, 1);
        assert_eq!(report.counts.prompts, 1);
        assert_eq!(report.counts.project_configs, 0);
        assert!(report.errors.is_empty());
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_profile_reference_rejected() {
        let store = Arc::new(SledComponentStore::temporary().unwrap());
        let dir = TempDir::new().unwrap();
        write_install(dir.path());
        fs::write(dir.path().join(".env"), "MODEL_PROFILE=missing\n").unwrap();

        let err = orchestrator(store.clone()).import(dir.path(), false).await.unwrap_err();
        match err {
            ApiError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("missing"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_budget_overrun_is_warning_not_failure() {
        let store = Arc::new(SledComponentStore::temporary().unwrap());
        let dir = TempDir::new().unwrap();
        write_install(dir.path());
        let config = ImportConfig {
            latency_budget_ms: 0,
            ..ImportConfig::default()
        };
        let importer = ImportOrchestrator::new(store.clone(), LayoutConfig::default(), config);

        let report = importer.import(dir.path(), false).await.unwrap();
        assert_eq!(report.counts.total(), 2);
        assert!(report.errors.is_empty());
        assert!(report.warnings.iter().any(|w| w.starts_with("import took")));
        assert!(report.warnings.iter().any(|w| w.starts_with("import.store took")));
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }
}
