use super::support::*;
use std::fs;
use switchboard::component::validation::validate_agent_config;
use switchboard::generators::{render_agent_manifest, AgentManifest};
use switchboard::parsers::models_source;
use switchboard::store::ComponentStore;
use switchboard::{ApiError, ComponentKind};
use tempfile::TempDir;

#[tokio::test]
async fn dry_run_reports_counts_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_minimal_install(dir.path());
    let store = temp_store();

    let report = importer(store.clone()).import(dir.path(), true).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.counts.agent_configs, 3);
    assert_eq!(report.counts.prompts, 5);
    assert_eq!(report.counts.total(), 8);
    assert!(report.errors.is_empty());
    assert!(store.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn full_import_stores_every_kind() {
    let dir = TempDir::new().unwrap();
    write_full_install(dir.path());
    let store = temp_store();

    let report = importer(store.clone()).import(dir.path(), false).await.unwrap();
    assert_eq!(report.counts.model_profiles, 1);
    assert_eq!(report.counts.project_configs, 1);
    assert_eq!(store.list(None).await.unwrap().len(), 10);

    let project = store
        .get(ComponentKind::ProjectConfig, "default")
        .await
        .unwrap()
        .unwrap();
    let payload: serde_json::Value = serde_json::from_str(&project.config).unwrap();
    assert_eq!(payload["modelProfile"], "balanced");
    let server = &payload["customMcpServers"][0];
    assert_eq!(server["id"], "foo");
    assert_eq!(server["type"], "command");
    assert_eq!(server["command"], "foo-server");
    assert!(server.get("args").is_none());
}

#[tokio::test]
async fn importing_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_full_install(dir.path());
    let store = temp_store();
    let orchestrator = importer(store.clone());

    orchestrator.import(dir.path(), false).await.unwrap();
    let first = store.list(None).await.unwrap();

    let report = orchestrator.import(dir.path(), false).await.unwrap();
    let second = store.list(None).await.unwrap();
    assert_eq!(report.unchanged, report.counts.total());
    assert_eq!(first, second);
}

#[tokio::test]
async fn one_invalid_entity_persists_nothing() {
    let dir = TempDir::new().unwrap();
    write_minimal_install(dir.path());
    fs::write(dir.path().join("prompts/planner.md"), "Too short").unwrap();
    let store = temp_store();

    let err = importer(store.clone()).import(dir.path(), false).await.unwrap_err();
    match err {
        ApiError::ValidationFailed(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("planner"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(store.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_entry_skipped_and_reported() {
    let dir = TempDir::new().unwrap();
    write_minimal_install(dir.path());
    fs::write(
        dir.path().join("agents/models.py"),
        r#"AGENT_CONFIGS = {
    "coder": {"tools": ["Read"], "mcp_servers": []},
    "planner": {"mcp_servers": []},
}"#,
    )
    .unwrap();
    let store = temp_store();

    let report = importer(store.clone()).import(dir.path(), false).await.unwrap();
    assert_eq!(report.counts.agent_configs, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("planner"));
}

#[test]
fn models_parse_validate_render_reparse_is_equal() {
    let parsed = models_source::parse_str(MODELS_SOURCE, "AGENT_CONFIGS").unwrap();
    assert!(parsed.errors.is_empty());
    for config in &parsed.items {
        assert!(validate_agent_config(config).is_valid());
    }

    let rendered = render_agent_manifest(&parsed.items).unwrap();
    let manifest: AgentManifest = serde_json::from_str(&rendered).unwrap();
    let mut reparsed: Vec<_> = manifest.agents.into_values().collect();
    let mut original = parsed.items.clone();
    original.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));
    reparsed.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));
    assert_eq!(reparsed, original);
    assert_eq!(original.len(), AGENT_TYPES.len());
}
