use super::support::*;
use std::fs;
use switchboard::parsers::{env_settings, phase_metadata, prompts_dir};
use switchboard::store::ComponentStore;
use tempfile::TempDir;

#[tokio::test]
async fn import_then_sync_reproduces_installation() {
    let source = TempDir::new().unwrap();
    write_full_install(source.path());
    let store = temp_store();
    importer(store.clone()).import(source.path(), false).await.unwrap();

    let target = TempDir::new().unwrap();
    let report = syncer(store.clone()).sync(target.path(), false).await.unwrap();
    // five prompts, manifest, phase metadata, settings
    assert_eq!(report.written_count, 8);
    assert!(report.errors.is_empty());
    assert!(report.backups.is_empty());

    let prompts = prompts_dir::parse_dir(&target.path().join("prompts")).await.unwrap();
    assert_eq!(prompts.items.len(), PROMPT_TYPES.len());
    assert!(prompts.items.iter().all(|p| p
        .injection_points
        .as_ref()
        .map(|i| i.spec_directory)
        .unwrap_or(false)));

    let profile = phase_metadata::parse_file(&target.path().join("task_metadata.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.phase_models["planning"], "opus");

    let settings = env_settings::parse_file(&target.path().join(".env")).await.unwrap();
    assert!(settings.errors.is_empty());
    assert_eq!(settings.config.model_profile.as_deref(), Some("balanced"));
    assert_eq!(settings.config.custom_mcp_servers.len(), 1);
}

#[tokio::test]
async fn one_blocked_file_does_not_stop_the_rest() {
    let source = TempDir::new().unwrap();
    write_minimal_install(source.path());
    let store = temp_store();
    importer(store.clone()).import(source.path(), false).await.unwrap();

    let target = TempDir::new().unwrap();
    fs::create_dir_all(target.path().join("agent_configs.json")).unwrap();

    let report = syncer(store).sync(target.path(), false).await.unwrap();
    // five prompts plus the blocked manifest
    assert_eq!(report.written_count, 5);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("agent_configs.json"));
}

#[tokio::test]
async fn overwrite_leaves_one_backup_with_prior_content() {
    let source = TempDir::new().unwrap();
    write_full_install(source.path());
    let store = temp_store();
    importer(store.clone()).import(source.path(), false).await.unwrap();

    let target = TempDir::new().unwrap();
    fs::write(target.path().join(".env"), "OLD_SETTING=1\n").unwrap();

    let report = syncer(store).sync(target.path(), false).await.unwrap();
    assert_eq!(report.backups.len(), 1);

    let backups: Vec<_> = fs::read_dir(target.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with(".env.backup."))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        fs::read_to_string(target.path().join(&backups[0])).unwrap(),
        "OLD_SETTING=1\n"
    );
    assert!(fs::read_to_string(target.path().join(".env"))
        .unwrap()
        .contains("MODEL_PROFILE=balanced"));
}

#[tokio::test]
async fn dry_run_lists_without_writing() {
    let source = TempDir::new().unwrap();
    write_minimal_install(source.path());
    let store = temp_store();
    importer(store.clone()).import(source.path(), false).await.unwrap();
    assert_eq!(store.list(None).await.unwrap().len(), 8);

    let target = TempDir::new().unwrap();
    let report = syncer(store).sync(target.path(), true).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.files_written.len(), 6);
    assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
}
