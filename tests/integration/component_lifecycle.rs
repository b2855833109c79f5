use super::support::*;
use serde_json::json;
use std::time::Duration;
use switchboard::component::service::{ComponentPatch, ComponentService};
use switchboard::{ApiError, ComponentCache, ComponentDraft, ComponentKind};
use tempfile::TempDir;

#[tokio::test]
async fn profile_in_use_cannot_be_deleted() {
    let source = TempDir::new().unwrap();
    write_full_install(source.path());
    let store = temp_store();
    importer(store.clone()).import(source.path(), false).await.unwrap();
    let service = ComponentService::new(store);

    let err = service
        .delete(ComponentKind::ModelProfile, "balanced")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    service
        .delete(ComponentKind::ProjectConfig, "default")
        .await
        .unwrap();
    service
        .delete(ComponentKind::ModelProfile, "balanced")
        .await
        .unwrap();
}

#[tokio::test]
async fn invalid_update_leaves_record_untouched() {
    let store = temp_store();
    let service = ComponentService::new(store);
    service
        .create(ComponentDraft::new(
            ComponentKind::AgentConfig,
            "coder",
            json!({"agentType": "coder", "tools": ["Read"], "mcpServers": ["context7"]}),
        ))
        .await
        .unwrap();

    let mut config = serde_json::Map::new();
    config.insert("mcpServersOptional".into(), json!(["context7"]));
    let err = service
        .update(
            ComponentKind::AgentConfig,
            "coder",
            ComponentPatch {
                config: Some(config),
                ..ComponentPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed(_)));

    let stored = service.get(ComponentKind::AgentConfig, "coder").await.unwrap();
    assert!(!stored.config.contains("mcpServersOptional"));
}

#[tokio::test]
async fn disabled_component_leaves_snapshot_after_expiry() {
    let store = temp_store();
    let service = ComponentService::new(store.clone());
    service
        .create(ComponentDraft::new(
            ComponentKind::Prompt,
            "coder",
            json!({"agentType": "coder", "promptContent": "Implement the plan step by step."}),
        ))
        .await
        .unwrap();

    let cache = ComponentCache::new(store, Duration::from_millis(50));
    assert_eq!(cache.snapshot().await.unwrap().prompts.len(), 1);

    service
        .update(
            ComponentKind::Prompt,
            "coder",
            ComponentPatch {
                enabled: Some(false),
                ..ComponentPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cache.snapshot().await.unwrap().prompts.len(), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(cache.snapshot().await.unwrap().prompts.is_empty());
}
