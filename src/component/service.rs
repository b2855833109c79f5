//! Component command service: validated CRUD over the component store.

use super::{Component, ComponentDraft, ComponentKind, TypedComponent};
use crate::error::ApiError;
use crate::store::ComponentStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Partial update. `None` fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ComponentPatch {
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub version: Option<String>,
    pub source_url: Option<String>,
    /// Top-level keys merged into the stored payload
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

pub struct ComponentService {
    store: Arc<dyn ComponentStore>,
}

impl ComponentService {
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, kind: ComponentKind, name: &str) -> Result<Component, ApiError> {
        self.store
            .get(kind, name)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("{} '{}'", kind, name)))
    }

    pub async fn list(&self, kind: Option<ComponentKind>) -> Result<Vec<Component>, ApiError> {
        Ok(self.store.list(kind).await?)
    }

    /// Validate and insert. Fails with a conflict when `(kind, name)` exists.
    pub async fn create(&self, draft: ComponentDraft) -> Result<Component, ApiError> {
        check_payload(draft.kind, &draft.name, &draft.config)?;
        if draft.kind == ComponentKind::ProjectConfig {
            self.check_profile_reference(&draft.config).await?;
        }

        let now = Utc::now();
        let record = draft.into_record(now, now);
        if !self.store.insert_new(&record).await? {
            return Err(ApiError::Conflict(format!(
                "{} '{}' already exists",
                record.kind, record.name
            )));
        }
        info!(kind = %record.kind, name = %record.name, "Created component");
        Ok(record)
    }

    /// Merge `patch` into the stored record and re-validate the result.
    pub async fn update(
        &self,
        kind: ComponentKind,
        name: &str,
        patch: ComponentPatch,
    ) -> Result<Component, ApiError> {
        let mut record = self.get(kind, name).await?;

        if let Some(fields) = patch.config {
            let mut payload: serde_json::Value = serde_json::from_str(&record.config)?;
            let object = payload.as_object_mut().ok_or_else(|| {
                ApiError::ValidationFailed(vec![format!(
                    "{} '{}': stored payload is not an object",
                    kind, name
                )])
            })?;
            for (key, value) in fields {
                object.insert(key, value);
            }
            check_payload(kind, name, &payload)?;
            if kind == ComponentKind::ProjectConfig {
                self.check_profile_reference(&payload).await?;
            }
            record.config = payload.to_string();
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(enabled) = patch.enabled {
            record.enabled = enabled;
        }
        if let Some(tags) = patch.tags {
            record.tags = tags;
        }
        if patch.version.is_some() {
            record.version = patch.version;
        }
        if patch.source_url.is_some() {
            record.source_url = patch.source_url;
        }
        record.updated_at = Utc::now();

        self.store.put(&record).await?;
        info!(kind = %kind, name = %name, "Updated component");
        Ok(record)
    }

    /// Remove a component. Model profiles referenced by a project config are kept.
    pub async fn delete(&self, kind: ComponentKind, name: &str) -> Result<(), ApiError> {
        if self.store.get(kind, name).await?.is_none() {
            return Err(ApiError::NotFound(format!("{} '{}'", kind, name)));
        }
        if kind == ComponentKind::ModelProfile {
            let referencing = self.projects_referencing(name).await?;
            if !referencing.is_empty() {
                return Err(ApiError::Conflict(format!(
                    "model_profile '{}' is referenced by project_config {}",
                    name,
                    referencing
                        .iter()
                        .map(|p| format!("'{}'", p))
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }
        self.store.delete(kind, name).await?;
        info!(kind = %kind, name = %name, "Deleted component");
        Ok(())
    }

    async fn projects_referencing(&self, profile: &str) -> Result<Vec<String>, ApiError> {
        let projects = self.store.list(Some(ComponentKind::ProjectConfig)).await?;
        Ok(projects
            .into_iter()
            .filter(|record| match record.typed() {
                Ok(TypedComponent::ProjectConfig(p)) => p.model_profile.as_deref() == Some(profile),
                _ => false,
            })
            .map(|record| record.name)
            .collect())
    }

    async fn check_profile_reference(&self, payload: &serde_json::Value) -> Result<(), ApiError> {
        let profile = payload
            .get("modelProfile")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());
        if let Some(profile) = profile {
            if self.store.get(ComponentKind::ModelProfile, profile).await?.is_none() {
                return Err(ApiError::ValidationFailed(vec![format!(
                    "project_config references unknown model_profile '{}'",
                    profile
                )]));
            }
        }
        Ok(())
    }
}

/// Parse and validate a payload against its kind's schema.
fn check_payload(kind: ComponentKind, name: &str, payload: &serde_json::Value) -> Result<(), ApiError> {
    let typed = TypedComponent::from_value(kind, payload.clone())
        .map_err(|e| ApiError::ValidationFailed(vec![format!("{} '{}': {}", kind, name, e)]))?;
    let mut errors = Vec::new();
    let natural = typed.name();
    if !natural.is_empty() && natural != name {
        errors.push(format!(
            "{} '{}': name does not match payload name '{}'",
            kind, name, natural
        ));
    }
    errors.extend(typed.validate(name).prefixed_errors());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SledComponentStore;
    use serde_json::json;

    fn service() -> ComponentService {
        ComponentService::new(Arc::new(SledComponentStore::temporary().unwrap()))
    }

    fn profile_json(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "phaseModels": {"spec": "opus", "planning": "opus", "coding": "sonnet", "qa": "haiku"},
            "phaseThinking": {"spec": "high", "planning": "high", "coding": "medium", "qa": "low"}
        })
    }

    fn agent_json(agent_type: &str) -> serde_json::Value {
        json!({"agentType": agent_type, "tools": ["Read"], "mcpServers": ["context7"]})
    }

    #[tokio::test]
    async fn test_create_then_conflict() {
        let svc = service();
        let draft = ComponentDraft::new(ComponentKind::AgentConfig, "coder", agent_json("coder"));
        svc.create(draft.clone()).await.unwrap();
        let err = svc.create(draft).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let svc = service();
        let draft = ComponentDraft::new(
            ComponentKind::AgentConfig,
            "coder",
            json!({"agentType": "coder", "tools": [], "mcpServers": [], "thinkingDefault": "max"}),
        );
        let err = svc.create(draft).await.unwrap_err();
        match err {
            ApiError::ValidationFailed(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(svc.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_partially() {
        let svc = service();
        let draft = ComponentDraft::new(ComponentKind::AgentConfig, "coder", agent_json("coder"))
            .with_description("writes code");
        let created = svc.create(draft).await.unwrap();

        let mut fields = serde_json::Map::new();
        fields.insert("thinkingDefault".into(), json!("high"));
        let patch = ComponentPatch {
            enabled: Some(false),
            config: Some(fields),
            ..ComponentPatch::default()
        };
        let updated = svc.update(ComponentKind::AgentConfig, "coder", patch).await.unwrap();
        assert_eq!(updated.description, "writes code");
        assert!(!updated.enabled);
        assert_eq!(updated.created_at, created.created_at);
        let payload: serde_json::Value = serde_json::from_str(&updated.config).unwrap();
        assert_eq!(payload["thinkingDefault"], "high");
        assert_eq!(payload["tools"], json!(["Read"]));
    }

    #[tokio::test]
    async fn test_update_revalidates() {
        let svc = service();
        svc.create(ComponentDraft::new(ComponentKind::AgentConfig, "coder", agent_json("coder")))
            .await
            .unwrap();
        let mut fields = serde_json::Map::new();
        fields.insert("mcpServersOptional".into(), json!(["context7"]));
        let patch = ComponentPatch {
            config: Some(fields),
            ..ComponentPatch::default()
        };
        let err = svc.update(ComponentKind::AgentConfig, "coder", patch).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_delete_profile_guarded_by_project_reference() {
        let svc = service();
        svc.create(ComponentDraft::new(ComponentKind::ModelProfile, "balanced", profile_json("balanced")))
            .await
            .unwrap();
        svc.create(ComponentDraft::new(
            ComponentKind::ProjectConfig,
            "default",
            json!({"modelProfile": "balanced"}),
        ))
        .await
        .unwrap();

        let err = svc.delete(ComponentKind::ModelProfile, "balanced").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        svc.delete(ComponentKind::ProjectConfig, "default").await.unwrap();
        svc.delete(ComponentKind::ModelProfile, "balanced").await.unwrap();
        assert!(matches!(
            svc.delete(ComponentKind::ModelProfile, "balanced").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_project_must_reference_existing_profile() {
        let svc = service();
        let err = svc
            .create(ComponentDraft::new(
                ComponentKind::ProjectConfig,
                "default",
                json!({"modelProfile": "missing"}),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(_)));
    }
}
