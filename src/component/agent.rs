//! Agent tool and MCP permission config.

use serde::{Deserialize, Serialize};

pub const DEFAULT_THINKING: &str = "medium";

/// Tool and MCP server permissions for one agent type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub agent_type: String,
    pub tools: Vec<String>,
    pub mcp_servers: Vec<String>,
    #[serde(default)]
    pub mcp_servers_optional: Vec<String>,
    #[serde(default)]
    pub auto_claude_tools: Vec<String>,
    #[serde(default = "default_thinking")]
    pub thinking_default: String,
}

fn default_thinking() -> String {
    DEFAULT_THINKING.to_string()
}

impl AgentConfig {
    /// Config with only the required fields; optional fields take their defaults.
    pub fn new(agent_type: impl Into<String>, tools: Vec<String>, mcp_servers: Vec<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            tools,
            mcp_servers,
            mcp_servers_optional: Vec::new(),
            auto_claude_tools: Vec::new(),
            thinking_default: default_thinking(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_field_names() {
        let config = AgentConfig::new("coder", vec!["Read".into()], vec!["context7".into()]);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "agentType": "coder",
                "tools": ["Read"],
                "mcpServers": ["context7"],
                "mcpServersOptional": [],
                "autoClaudeTools": [],
                "thinkingDefault": "medium"
            })
        );
    }

    #[test]
    fn test_required_fields_enforced() {
        let result: Result<AgentConfig, _> =
            serde_json::from_value(json!({"agentType": "coder", "tools": []}));
        assert!(result.is_err());
    }
}
