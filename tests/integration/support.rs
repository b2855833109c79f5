//! Fixture installations written into temporary directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use switchboard::config::{ImportConfig, LayoutConfig, SyncConfig};
use switchboard::sync::MemoryProbe;
use switchboard::{ComponentCache, ImportOrchestrator, SledComponentStore, SyncOrchestrator};

pub const AGENT_TYPES: [&str; 3] = ["coder", "planner", "qa_reviewer"];
pub const PROMPT_TYPES: [&str; 5] = ["coder", "planner", "qa_reviewer", "qa_fixer", "spec_writer"];

pub const MODELS_SOURCE: &str = r#"from typing import Any

# Tool and MCP permissions per agent type
AGENT_CONFIGS: dict[str, Any] = {
    "coder": {
        "tools": ["Read", "Write", "Edit", "Bash"],
        "mcp_servers": ["context7"],
        "mcp_servers_optional": ["linear"],
        "thinking_default": "high",
    },
    "planner": {
        "tools": ["Read", "Glob", "Grep"],
        "mcp_servers": [],
    },
    "qa_reviewer": {
        "tools": ["Read", "Bash"],
        "mcp_servers": ["puppeteer"],
        "auto_claude_tools": ["update_qa_status"],
    },
}
"#;

pub const PHASE_METADATA: &str = r#"{
  "name": "balanced",
  "description": "Opus for planning, Sonnet elsewhere",
  "phaseModels": {"spec": "sonnet", "planning": "opus", "coding": "sonnet", "qa": "sonnet"},
  "phaseThinking": {"spec": "medium", "planning": "high", "coding": "medium", "qa": "low"}
}
"#;

pub const SETTINGS: &str = "CONTEXT7_ENABLED=true
LINEAR_MCP_ENABLED=false
MODEL_PROFILE=balanced
CUSTOM_MCP_FOO_TYPE=command
CUSTOM_MCP_FOO_COMMAND=foo-server
AGENT_QA_REVIEWER_MCP_ADD=puppeteer
";

/// Models source plus one prompt per entry of `PROMPT_TYPES`.
pub fn write_minimal_install(root: &Path) {
    fs::create_dir_all(root.join("agents")).unwrap();
    fs::create_dir_all(root.join("prompts")).unwrap();
    fs::write(root.join("agents/models.py"), MODELS_SOURCE).unwrap();
    for agent in PROMPT_TYPES {
        fs::write(
            root.join(format!("prompts/{}.md", agent)),
            format!(
                "---\ndescription: {} prompt\n---\n\nYou are the {} agent. Work from {{{{specDirectory}}}}.\n",
                agent, agent
            ),
        )
        .unwrap();
    }
}

/// Minimal install plus phase metadata and integration settings.
pub fn write_full_install(root: &Path) {
    write_minimal_install(root);
    fs::write(root.join("task_metadata.json"), PHASE_METADATA).unwrap();
    fs::write(root.join(".env"), SETTINGS).unwrap();
}

pub fn temp_store() -> Arc<SledComponentStore> {
    Arc::new(SledComponentStore::temporary().unwrap())
}

pub fn importer(store: Arc<SledComponentStore>) -> ImportOrchestrator {
    ImportOrchestrator::new(store, LayoutConfig::default(), ImportConfig::default())
}

pub struct QuietProbe;

impl MemoryProbe for QuietProbe {
    fn usage_ratio(&self) -> Option<f64> {
        Some(0.1)
    }
}

pub fn syncer(store: Arc<SledComponentStore>) -> SyncOrchestrator {
    let cache = Arc::new(ComponentCache::new(store, std::time::Duration::from_secs(30)));
    SyncOrchestrator::with_probe(
        cache,
        LayoutConfig::default(),
        SyncConfig::default(),
        ImportConfig::default().project_name,
        Arc::new(QuietProbe),
    )
}
