//! Recovery of agent configs from the models source file.
//!
//! The file holds one top-level dictionary assignment, e.g.
//!
//! ```text
//! AGENT_CONFIGS: dict[str, dict] = {
//!     "coder": {
//!         "tools": ["Read", "Write"],
//!         "mcp_servers": ["context7"],
//!         "thinking_default": "high",
//!     },
//! }
//! ```
//!
//! The assignment line is located with a regex; its dictionary, each entry, and each
//! list value are then matched structurally with the quote-aware scanner. List values must be literal lists of quoted strings. Entries
//! that do not fit this grammar are skipped and reported.

use super::scan::{find_matching, split_once_top_level, split_top_level, strip_line_comments, unquote};
use super::ParseOutput;
use crate::component::agent::DEFAULT_THINKING;
use crate::component::AgentConfig;
use crate::error::ParseError;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read and parse the models source file.
pub async fn parse_file(path: &Path, assignment: &str) -> Result<ParseOutput<AgentConfig>, ParseError> {
    let src = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ParseError::io(path, e))?;
    let output = parse_str(&src, assignment).map_err(|message| ParseError::syntax(path, message))?;
    debug!(
        path = %path.display(),
        configs = output.items.len(),
        errors = output.errors.len(),
        "Parsed models source"
    );
    Ok(output)
}

/// Parse source text. Err when the assignment or its closing brace cannot be found.
pub fn parse_str(src: &str, assignment: &str) -> Result<ParseOutput<AgentConfig>, String> {
    let src = strip_line_comments(src);
    let body = locate_assignment_body(&src, assignment)?;

    let mut output = ParseOutput::default();
    for raw in split_top_level(body, b',') {
        if raw.trim().is_empty() {
            continue;
        }
        match parse_entry(raw) {
            Ok(config) => output.items.push(config),
            Err(e) => output.errors.push(e),
        }
    }
    Ok(output)
}

fn locate_assignment_body<'a>(src: &'a str, assignment: &str) -> Result<&'a str, String> {
    let pattern = format!(
        r"(?m)^[ \t]*{}[ \t]*(?::[^=\n]*)?=[ \t]*",
        regex::escape(assignment)
    );
    let re = Regex::new(&pattern).map_err(|e| format!("invalid assignment name '{}': {}", assignment, e))?;
    let m = re
        .find(src)
        .ok_or_else(|| format!("assignment '{}' not found", assignment))?;

    let rest = &src[m.end()..];
    let offset = rest.len() - rest.trim_start().len();
    let open = m.end() + offset;
    if src.as_bytes().get(open) != Some(&b'{') {
        return Err(format!("assignment '{}' is not a dictionary literal", assignment));
    }
    let close = find_matching(src, open)
        .ok_or_else(|| format!("closing brace for '{}' not found", assignment))?;
    Ok(&src[open + 1..close])
}

fn parse_entry(raw: &str) -> Result<AgentConfig, String> {
    let (key, value) = split_once_top_level(raw, b':')
        .ok_or_else(|| format!("entry '{}' is not a key: value pair", snippet(raw)))?;
    let agent_type = unquote(key)
        .ok_or_else(|| format!("entry key {} is not a string literal", snippet(key)))?
        .to_string();

    let value = value.trim();
    let is_dict = value.starts_with('{') && find_matching(value, 0) == Some(value.len() - 1);
    if !is_dict {
        return Err(format!("entry '{}': value is not a dictionary literal", agent_type));
    }

    let fields = entry_fields(&value[1..value.len() - 1])
        .map_err(|e| format!("entry '{}': {}", agent_type, e))?;
    let list = |field: &str, required: bool| -> Result<Vec<String>, String> {
        match fields.get(field) {
            Some(raw) => string_list(raw)
                .map_err(|e| format!("entry '{}': field '{}' {}", agent_type, field, e)),
            None if required => Err(format!(
                "entry '{}': missing required field '{}'",
                agent_type, field
            )),
            None => Ok(Vec::new()),
        }
    };

    let tools = list("tools", true)?;
    let mcp_servers = list("mcp_servers", true)?;
    let mcp_servers_optional = list("mcp_servers_optional", false)?;
    let auto_claude_tools = list("auto_claude_tools", false)?;
    let thinking_default = match fields.get("thinking_default") {
        Some(raw) => string_literal(raw).ok_or_else(|| {
            format!(
                "entry '{}': field 'thinking_default' is not a string literal",
                agent_type
            )
        })?,
        None => DEFAULT_THINKING.to_string(),
    };

    Ok(AgentConfig {
        agent_type,
        tools,
        mcp_servers,
        mcp_servers_optional,
        auto_claude_tools,
        thinking_default,
    })
}

/// Top-level `"key": value` pairs of a dictionary body. Later keys win.
fn entry_fields(body: &str) -> Result<HashMap<String, &str>, String> {
    let mut fields = HashMap::new();
    for raw in split_top_level(body, b',') {
        if raw.trim().is_empty() {
            continue;
        }
        let (key, value) = split_once_top_level(raw, b':')
            .ok_or_else(|| format!("field '{}' is not a key: value pair", snippet(raw)))?;
        let key = string_literal(key)
            .ok_or_else(|| format!("field key {} is not a string literal", snippet(key)))?;
        fields.insert(key, value.trim());
    }
    Ok(fields)
}

/// A single quoted literal with no embedded quote of the same kind.
fn string_literal(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let inner = unquote(raw)?;
    let quote = raw.chars().next()?;
    if inner.contains(quote) {
        return None;
    }
    Some(inner.to_string())
}

fn string_list(raw: &str) -> Result<Vec<String>, String> {
    let raw = raw.trim();
    let is_list = raw.starts_with('[') && find_matching(raw, 0) == Some(raw.len() - 1);
    if !is_list {
        return Err("is not a list literal".to_string());
    }
    let mut items = Vec::new();
    for item in split_top_level(&raw[1..raw.len() - 1], b',') {
        if item.trim().is_empty() {
            continue;
        }
        let value = string_literal(item)
            .ok_or_else(|| format!("has a non-string item {}", snippet(item)))?;
        items.push(value);
    }
    Ok(items)
}

fn snippet(s: &str) -> String {
    let trimmed = s.trim();
    match trimmed.char_indices().nth(40) {
        Some((i, _)) => format!("{}...", &trimmed[..i]),
        None => trimmed.to_string(),
    }
}
