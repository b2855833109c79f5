//! Generators
//!
//! Pure renderers turning stored components back into installation files. Each
//! output re-parses with the matching source parser into an equal entity.

use crate::cache::ComponentSnapshot;
use crate::component::{AgentConfig, McpServerType, ModelProfile, ProjectConfig, Prompt};
use crate::config::LayoutConfig;
use crate::parsers::env_settings::{MODEL_PROFILE_KEY, TOGGLES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A file the sync step should write, relative to the target root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub relative_path: PathBuf,
    pub contents: String,
}

/// On-disk shape of the aggregated agent manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentManifest {
    pub agents: BTreeMap<String, AgentConfig>,
}

pub fn render_prompt_markdown(prompt: &Prompt) -> String {
    let mut out = String::new();
    if !prompt.front_matter.is_empty() {
        out.push_str("---\n");
        for (key, value) in &prompt.front_matter {
            out.push_str(&format!("{}: {}\n", key, quote_if_needed(value)));
        }
        out.push_str("---\n\n");
    }
    out.push_str(prompt.prompt_content.trim());
    out.push('\n');
    out
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value != value.trim()
        || value.contains(':')
        || value.starts_with(['"', '\'', '#']);
    if needs_quotes && !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

pub fn render_agent_manifest(configs: &[AgentConfig]) -> Result<String, serde_json::Error> {
    let manifest = AgentManifest {
        agents: configs
            .iter()
            .map(|c| (c.agent_type.clone(), c.clone()))
            .collect(),
    };
    let mut out = serde_json::to_string_pretty(&manifest)?;
    out.push('\n');
    Ok(out)
}

pub fn render_phase_metadata(profile: &ModelProfile) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(profile)?;
    out.push('\n');
    Ok(out)
}

fn env_key_segment(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

pub fn render_settings_env(project: &ProjectConfig) -> String {
    let mut lines = vec!["# Integration settings".to_string()];
    let toggles = [
        project.context7_enabled,
        project.linear_mcp_enabled,
        project.electron_mcp_enabled,
        project.puppeteer_mcp_enabled,
        project.graphiti_enabled,
    ];
    for ((key, _), value) in TOGGLES.iter().zip(toggles) {
        lines.push(format!("{}={}", key, value));
    }
    if let Some(profile) = &project.model_profile {
        lines.push(format!("{}={}", MODEL_PROFILE_KEY, profile));
    }

    if !project.custom_mcp_servers.is_empty() {
        lines.push(String::new());
        lines.push("# Custom MCP servers".to_string());
    }
    for server in &project.custom_mcp_servers {
        let prefix = format!("CUSTOM_MCP_{}", env_key_segment(&server.id));
        lines.push(format!("{}_TYPE={}", prefix, server.server_type));
        lines.push(format!("{}_NAME={}", prefix, server.name));
        match server.server_type {
            McpServerType::Command => {
                if let Some(command) = &server.command {
                    lines.push(format!("{}_COMMAND={}", prefix, command));
                }
                if let Some(args) = &server.args {
                    lines.push(format!("{}_ARGS={}", prefix, args.join(" ")));
                }
            }
            McpServerType::Http => {
                if let Some(url) = &server.url {
                    lines.push(format!("{}_URL={}", prefix, url));
                }
                if let Some(headers) = &server.headers {
                    let joined = headers
                        .iter()
                        .map(|(k, v)| format!("{}:{}", k, v))
                        .collect::<Vec<_>>()
                        .join(",");
                    lines.push(format!("{}_HEADERS={}", prefix, joined));
                }
            }
        }
    }

    if !project.agent_mcp_overrides.is_empty() {
        lines.push(String::new());
        lines.push("# Per-agent MCP overrides".to_string());
    }
    for (agent_type, over) in &project.agent_mcp_overrides {
        let prefix = format!("AGENT_{}_MCP", env_key_segment(agent_type));
        lines.push(format!("{}_ADD={}", prefix, over.add.join(",")));
        lines.push(format!("{}_REMOVE={}", prefix, over.remove.join(",")));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// The profile a sync renders: the project's reference when it resolves,
/// otherwise the first profile by name.
pub fn active_profile<'a>(
    snapshot: &'a ComponentSnapshot,
    project: Option<&ProjectConfig>,
) -> Option<&'a ModelProfile> {
    project
        .and_then(|p| p.model_profile.as_deref())
        .and_then(|name| snapshot.profile(name))
        .or_else(|| snapshot.model_profiles.first())
}

/// Every file a sync of `snapshot` produces.
pub fn plan_files(
    snapshot: &ComponentSnapshot,
    layout: &LayoutConfig,
    project_name: &str,
) -> Result<Vec<PlannedFile>, serde_json::Error> {
    let mut files: Vec<PlannedFile> = snapshot
        .prompts
        .iter()
        .map(|prompt| PlannedFile {
            relative_path: layout.prompts_dir.join(format!("{}.md", prompt.agent_type)),
            contents: render_prompt_markdown(prompt),
        })
        .collect();

    if !snapshot.agent_configs.is_empty() {
        files.push(PlannedFile {
            relative_path: layout.manifest_file.clone(),
            contents: render_agent_manifest(&snapshot.agent_configs)?,
        });
    }

    let project = snapshot.project(project_name);
    if let Some(profile) = active_profile(snapshot, project) {
        files.push(PlannedFile {
            relative_path: layout.phase_metadata_file.clone(),
            contents: render_phase_metadata(profile)?,
        });
    }
    if let Some(project) = project {
        files.push(PlannedFile {
            relative_path: layout.settings_file.clone(),
            contents: render_settings_env(project),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::validation::validate_project_config;
    use crate::component::{CustomMcpServer, McpOverride};
    use crate::parsers::{env_settings, phase_metadata, prompts_dir};
    use proptest::prelude::*;

    fn profile(name: &str) -> ModelProfile {
        let phases = ["spec", "planning", "coding", "qa"];
        ModelProfile {
            name: name.to_string(),
            description: format!("{} profile", name),
            phase_models: phases.iter().map(|p| (p.to_string(), "sonnet".to_string())).collect(),
            phase_thinking: phases.iter().map(|p| (p.to_string(), "medium".to_string())).collect(),
        }
    }

    #[test]
    fn test_prompt_round_trip() {
        let mut prompt = Prompt::new("coder", "Use {{specDirectory}} and {{mcpDocumentation}}.");
        prompt.front_matter.insert("name".into(), "Coder".into());
        prompt.front_matter.insert("summary".into(), "role: implementer".into());
        let text = render_prompt_markdown(&prompt);
        let parsed = prompts_dir::parse_document("coder", &text).unwrap();
        assert_eq!(parsed, prompt);
    }

    #[test]
    fn test_manifest_shape() {
        let configs = vec![
            AgentConfig::new("qa", vec!["Read".into()], vec![]),
            AgentConfig::new("coder", vec!["Write".into()], vec!["context7".into()]),
        ];
        let text = render_agent_manifest(&configs).unwrap();
        let manifest: AgentManifest = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = manifest.agents.keys().cloned().collect();
        assert_eq!(keys, vec!["coder", "qa"]);
        assert_eq!(manifest.agents["coder"], configs[1]);
    }

    #[test]
    fn test_phase_metadata_round_trip() {
        let p = profile("balanced");
        let text = render_phase_metadata(&p).unwrap();
        assert_eq!(phase_metadata::parse_str(&text).unwrap(), p);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut project = ProjectConfig {
            electron_mcp_enabled: true,
            model_profile: Some("balanced".into()),
            ..ProjectConfig::default()
        };
        project.custom_mcp_servers = vec![
            CustomMcpServer {
                id: "docs".into(),
                name: "Docs".into(),
                server_type: McpServerType::Http,
                command: None,
                args: None,
                url: Some("https://docs.example.com".into()),
                headers: Some([("X-Key".to_string(), "abc".to_string())].into_iter().collect()),
            },
            CustomMcpServer {
                id: "foo".into(),
                name: "foo".into(),
                server_type: McpServerType::Command,
                command: Some("foo-server".into()),
                args: Some(vec!["--stdio".into()]),
                url: None,
                headers: None,
            },
        ];
        project.agent_mcp_overrides.insert(
            "qa_reviewer".into(),
            McpOverride {
                add: vec!["puppeteer".into()],
                remove: vec![],
            },
        );

        let text = render_settings_env(&project);
        let parsed = env_settings::parse_str(&text);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config, project);
    }

    #[test]
    fn test_plan_files_layout() {
        let snapshot = ComponentSnapshot {
            agent_configs: vec![AgentConfig::new("coder", vec![], vec![])],
            prompts: vec![
                Prompt::new("coder", "Implement the plan."),
                Prompt::new("qa", "Review the change."),
            ],
            model_profiles: vec![profile("alpha"), profile("balanced")],
            project_configs: vec![(
                "default".into(),
                ProjectConfig {
                    model_profile: Some("balanced".into()),
                    ..ProjectConfig::default()
                },
            )],
        };
        let files = plan_files(&snapshot, &LayoutConfig::default(), "default").unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("prompts/coder.md"),
                PathBuf::from("prompts/qa.md"),
                PathBuf::from("agent_configs.json"),
                PathBuf::from("task_metadata.json"),
                PathBuf::from(".env"),
            ]
        );
        let metadata = phase_metadata::parse_str(&files[3].contents).unwrap();
        assert_eq!(metadata.name, "balanced");
    }

    #[test]
    fn test_plan_without_project_uses_first_profile() {
        let snapshot = ComponentSnapshot {
            model_profiles: vec![profile("alpha"), profile("beta")],
            ..ComponentSnapshot::default()
        };
        let files = plan_files(&snapshot, &LayoutConfig::default(), "default").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].contents.contains("\"alpha\""));
    }

    proptest! {
        #[test]
        fn prop_valid_command_server_round_trips(
            id in "[a-z0-9_]{1,10}",
            name in "[A-Za-z][A-Za-z0-9 ]{0,10}[A-Za-z0-9]",
            command in "[a-z/.-]{1,12}",
            args in prop::collection::vec("[a-zA-Z0-9=/._-]{1,8}", 1..4),
            agent in "[a-z_]{1,8}",
            add in prop::collection::vec("[a-z0-9]{1,6}", 0..3),
        ) {
            let mut project = ProjectConfig::default();
            project.custom_mcp_servers = vec![CustomMcpServer {
                id,
                name,
                server_type: McpServerType::Command,
                command: Some(command),
                args: Some(args),
                url: None,
                headers: None,
            }];
            project.agent_mcp_overrides.insert(agent, McpOverride { add, remove: vec![] });
            prop_assert!(validate_project_config("default", &project).is_valid());

            let parsed = env_settings::parse_str(&render_settings_env(&project));
            prop_assert!(parsed.errors.is_empty());
            prop_assert_eq!(parsed.config, project);
        }
    }
}
