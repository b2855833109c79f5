//! Project settings from a `KEY=VALUE` file.
//!
//! Flat keys are folded back into structure by key pattern:
//! `CUSTOM_MCP_<ID>_*` groups become custom servers and
//! `AGENT_<TYPE>_MCP_{ADD,REMOVE}` become per-agent overrides.

use super::prompts_dir::strip_quotes;
use crate::component::{CustomMcpServer, McpOverride, McpServerType, ProjectConfig};
use crate::error::ParseError;
use crate::regex_util::static_regex;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

static_regex!(fn custom_server_type_key, r"^CUSTOM_MCP_([A-Z0-9_]+)_TYPE$");
static_regex!(fn agent_override_key, r"^AGENT_([A-Z0-9_]+)_MCP_(ADD|REMOVE)$");

/// Boolean toggles and their defaults when the key is absent.
pub const TOGGLES: [(&str, bool); 5] = [
    ("CONTEXT7_ENABLED", true),
    ("LINEAR_MCP_ENABLED", true),
    ("ELECTRON_MCP_ENABLED", false),
    ("PUPPETEER_MCP_ENABLED", false),
    ("GRAPHITI_ENABLED", false),
];

pub const MODEL_PROFILE_KEY: &str = "MODEL_PROFILE";

/// Project config recovered from a settings file, plus per-server errors.
#[derive(Debug, Clone, Default)]
pub struct SettingsOutput {
    pub config: ProjectConfig,
    pub errors: Vec<String>,
}

pub async fn parse_file(path: &Path) -> Result<SettingsOutput, ParseError> {
    let src = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ParseError::io(path, e))?;
    let output = parse_str(&src);
    debug!(
        path = %path.display(),
        custom_servers = output.config.custom_mcp_servers.len(),
        overrides = output.config.agent_mcp_overrides.len(),
        errors = output.errors.len(),
        "Parsed settings file"
    );
    Ok(output)
}

pub fn parse_str(src: &str) -> SettingsOutput {
    let vars = parse_pairs(src);
    let mut errors = Vec::new();

    let flag = |key: &str| {
        let default = TOGGLES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, d)| *d)
            .unwrap_or(false);
        vars.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    };

    let config = ProjectConfig {
        context7_enabled: flag("CONTEXT7_ENABLED"),
        linear_mcp_enabled: flag("LINEAR_MCP_ENABLED"),
        electron_mcp_enabled: flag("ELECTRON_MCP_ENABLED"),
        puppeteer_mcp_enabled: flag("PUPPETEER_MCP_ENABLED"),
        graphiti_enabled: flag("GRAPHITI_ENABLED"),
        model_profile: vars
            .get(MODEL_PROFILE_KEY)
            .filter(|v| !v.is_empty())
            .cloned(),
        custom_mcp_servers: custom_servers(&vars, &mut errors),
        agent_mcp_overrides: agent_overrides(&vars),
    };

    SettingsOutput { config, errors }
}

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments, and lines without `=` are
/// skipped; later keys win.
pub fn parse_pairs(src: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut rest = src;
    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        rest = next;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(eq) = line.find('=') else {
            continue;
        };
        let key = line[..eq].trim();
        let key = key.strip_prefix("export ").map(str::trim).unwrap_or(key);
        if key.is_empty() {
            continue;
        }
        let value = strip_quotes(line[eq + 1..].trim());
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}

fn custom_servers(vars: &BTreeMap<String, String>, errors: &mut Vec<String>) -> Vec<CustomMcpServer> {
    let mut servers = Vec::new();
    for (key, type_value) in vars {
        let Some(caps) = custom_server_type_key().captures(key) else {
            continue;
        };
        let raw_id = &caps[1];
        let id = raw_id.to_ascii_lowercase();
        let get = |suffix: &str| {
            vars.get(&format!("CUSTOM_MCP_{}_{}", raw_id, suffix))
                .map(String::as_str)
                .filter(|v| !v.is_empty())
        };

        let Some(server_type) = McpServerType::parse(type_value) else {
            errors.push(format!(
                "custom MCP server '{}': unknown type '{}' (expected command or http)",
                id, type_value
            ));
            continue;
        };

        let mut server = CustomMcpServer {
            name: get("NAME").map(str::to_string).unwrap_or_else(|| id.clone()),
            id: id.clone(),
            server_type,
            command: None,
            args: None,
            url: None,
            headers: None,
        };

        match server_type {
            McpServerType::Command => {
                let Some(command) = get("COMMAND") else {
                    errors.push(format!(
                        "custom MCP server '{}': CUSTOM_MCP_{}_COMMAND is required for command servers",
                        id, raw_id
                    ));
                    continue;
                };
                server.command = Some(command.to_string());
                server.args = get("ARGS").map(|a| a.split_whitespace().map(str::to_string).collect());
            }
            McpServerType::Http => {
                let Some(url) = get("URL") else {
                    errors.push(format!(
                        "custom MCP server '{}': CUSTOM_MCP_{}_URL is required for http servers",
                        id, raw_id
                    ));
                    continue;
                };
                server.url = Some(url.to_string());
                if let Some(raw) = get("HEADERS") {
                    let mut headers = BTreeMap::new();
                    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        match pair.split_once(':') {
                            Some((k, v)) if !k.trim().is_empty() => {
                                headers.insert(k.trim().to_string(), v.trim().to_string());
                            }
                            _ => errors.push(format!(
                                "custom MCP server '{}': ignoring malformed header '{}'",
                                id, pair
                            )),
                        }
                    }
                    server.headers = (!headers.is_empty()).then_some(headers);
                }
            }
        }
        servers.push(server);
    }
    servers
}

fn agent_overrides(vars: &BTreeMap<String, String>) -> BTreeMap<String, McpOverride> {
    let mut overrides: BTreeMap<String, McpOverride> = BTreeMap::new();
    for (key, value) in vars {
        let Some(caps) = agent_override_key().captures(key) else {
            continue;
        };
        let agent_type = caps[1].to_ascii_lowercase();
        let servers: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let entry = overrides.entry(agent_type).or_default();
        if &caps[2] == "ADD" {
            entry.add = servers;
        } else {
            entry.remove = servers;
        }
    }
    overrides
}
