use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A host application configuration document.
///
/// Only the servers registry entry owned by the launcher is ever changed;
/// every other key is carried through as an opaque JSON value.
pub type ConfigDocument = Map<String, Value>;

/// Registration of a single MCP server inside the host application config.
///
/// This is the entry the host application reads to learn how to launch the
/// server: the command to execute, its arguments, and environment overrides.
///
/// # Examples
///
/// ```
/// use mcp_launcher::config::ServerConfig;
/// use std::collections::HashMap;
///
/// let mut env = HashMap::new();
/// env.insert("DEBUG".to_string(), "true".to_string());
///
/// let server_config = ServerConfig {
///     command: "python3".to_string(),
///     args: vec!["main.py".to_string(), "--transport".to_string(), "http".to_string()],
///     env,
/// };
/// assert_eq!(server_config.args[0], "main.py");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Command to execute when starting the MCP server.
    /// This can be an absolute path or a command available in the PATH.
    pub command: String,

    /// Command-line arguments to pass to the server.
    pub args: Vec<String>,

    /// Environment variables to set when launching the server.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl ServerConfig {
    /// Converts the registration into the JSON value stored in the registry.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::ConfigWrite(format!("Failed to serialize server entry: {}", e)))
    }
}

/// Parses a configuration document.
///
/// Empty or whitespace-only content is treated as an empty document, the
/// same as a missing file. Anything else must be a JSON object.
///
/// # Errors
///
/// Returns [`Error::ConfigRead`] if the content is not valid JSON or its
/// top-level value is not an object.
pub fn parse_document(content: &str) -> Result<ConfigDocument> {
    if content.trim().is_empty() {
        return Ok(ConfigDocument::new());
    }

    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::ConfigRead(format!("Failed to parse JSON config: {}", e)))?;

    match value {
        Value::Object(document) => Ok(document),
        other => Err(Error::ConfigRead(format!(
            "Expected a JSON object at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

/// Renders a configuration document as pretty-printed JSON.
///
/// Uses two-space indentation and ends with a newline.
pub fn render_document(document: &ConfigDocument) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(document)
        .map_err(|e| Error::ConfigWrite(format!("Failed to serialize config: {}", e)))?;
    rendered.push('\n');
    Ok(rendered)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
