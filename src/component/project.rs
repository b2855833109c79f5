//! Project-level integration toggles and custom MCP servers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Project integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default = "default_true")]
    pub context7_enabled: bool,
    #[serde(default = "default_true")]
    pub linear_mcp_enabled: bool,
    #[serde(default)]
    pub electron_mcp_enabled: bool,
    #[serde(default)]
    pub puppeteer_mcp_enabled: bool,
    #[serde(default)]
    pub graphiti_enabled: bool,
    /// Name of the model profile the project runs with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_profile: Option<String>,
    #[serde(default)]
    pub custom_mcp_servers: Vec<CustomMcpServer>,
    #[serde(default)]
    pub agent_mcp_overrides: BTreeMap<String, McpOverride>,
}

fn default_true() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            context7_enabled: true,
            linear_mcp_enabled: true,
            electron_mcp_enabled: false,
            puppeteer_mcp_enabled: false,
            graphiti_enabled: false,
            model_profile: None,
            custom_mcp_servers: Vec::new(),
            agent_mcp_overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpServerType {
    Command,
    Http,
}

impl McpServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            McpServerType::Command => "command",
            McpServerType::Http => "http",
        }
    }

    /// Case-insensitive parse of the settings-file spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "command" => Some(McpServerType::Command),
            "http" => Some(McpServerType::Http),
            _ => None,
        }
    }
}

impl fmt::Display for McpServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-defined MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMcpServer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub server_type: McpServerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Per-agent MCP server additions and removals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpOverride {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_defaults() {
        let config: ProjectConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.context7_enabled);
        assert!(config.linear_mcp_enabled);
        assert!(!config.electron_mcp_enabled);
        assert!(!config.puppeteer_mcp_enabled);
        assert!(!config.graphiti_enabled);
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_command_server_omits_absent_fields() {
        let server = CustomMcpServer {
            id: "foo".into(),
            name: "foo".into(),
            server_type: McpServerType::Command,
            command: Some("foo-server".into()),
            args: None,
            url: None,
            headers: None,
        };
        let value = serde_json::to_value(&server).unwrap();
        assert_eq!(
            value,
            json!({"id": "foo", "name": "foo", "type": "command", "command": "foo-server"})
        );
    }

    #[test]
    fn test_server_type_parse() {
        assert_eq!(McpServerType::parse("HTTP"), Some(McpServerType::Http));
        assert_eq!(McpServerType::parse("socket"), None);
    }
}
