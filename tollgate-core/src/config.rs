//! Static per-tool approval configuration.
//!
//! The configuration is a flat JSON object keyed by tool name:
//!
//! ```json
//! {
//!   "read_file": { "pre_approved": true },
//!   "list_files": { "pre_approved": true }
//! }
//! ```
//!
//! Tools that are missing, or present without `pre_approved: true`, need
//! approval.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Settings for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Run without asking.
    #[serde(default)]
    pub pre_approved: bool,
}

impl ToolConfig {
    /// Config for a tool that runs without asking.
    pub fn pre_approved() -> Self {
        Self { pre_approved: true }
    }
}

/// Tool name to [`ToolConfig`] mapping. Read-only once a gate is built.
///
/// # Example
///
/// ```rust
/// use tollgate_core::ApprovalConfig;
///
/// let config = ApprovalConfig::new()
///     .pre_approve("get_time")
///     .pre_approve("list_files");
///
/// assert!(config.is_pre_approved("get_time"));
/// assert!(!config.is_pre_approved("delete_file"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalConfig {
    tools: HashMap<String, ToolConfig>,
}

impl ApprovalConfig {
    /// Create an empty configuration (every tool needs approval).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a tool as pre-approved.
    pub fn pre_approve(self, tool_name: impl Into<String>) -> Self {
        self.with_tool(tool_name, ToolConfig::pre_approved())
    }

    /// Set the config for a tool, replacing any existing entry.
    pub fn with_tool(mut self, tool_name: impl Into<String>, config: ToolConfig) -> Self {
        self.tools.insert(tool_name.into(), config);
        self
    }

    /// Config for a tool, if present.
    pub fn get(&self, tool_name: &str) -> Option<&ToolConfig> {
        self.tools.get(tool_name)
    }

    /// True when the tool is configured with `pre_approved: true`.
    pub fn is_pre_approved(&self, tool_name: &str) -> bool {
        self.get(tool_name).is_some_and(|c| c.pre_approved)
    }

    /// Names of all configured tools.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Number of configured tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tool is configured.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid approval config: {}", e)))
    }
}

impl FromIterator<(String, ToolConfig)> for ApprovalConfig {
    fn from_iter<I: IntoIterator<Item = (String, ToolConfig)>>(iter: I) -> Self {
        Self {
            tools: iter.into_iter().collect(),
        }
    }
}

/// Load an approval configuration from a JSON file.
///
/// Supports environment variable expansion using `${VAR}` or `${VAR:-default}`
/// syntax. The path itself is also expanded using shell expansion (e.g.
/// `~/.config/tollgate/approvals.json`).
pub async fn load_config_file(path: impl AsRef<Path>) -> Result<ApprovalConfig> {
    let path_str = path.as_ref().to_string_lossy().to_string();
    let expanded_path = shellexpand::tilde(&path_str);
    let path = Path::new(expanded_path.as_ref());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let expanded_content = expand_env_vars(&content)?;
    let config = ApprovalConfig::from_json_str(&expanded_content)?;

    log::debug!(
        "loaded approval config from {} ({} tools)",
        path.display(),
        config.len()
    );
    Ok(config)
}

/// Expand environment variables in a string
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, or empty string if not set
/// - `${VAR:-default}` - expands to the value of VAR, or "default" if not set
fn expand_env_vars(input: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // consume '{'

        let mut var_name = String::new();
        let mut default_value = None;
        let mut closed = false;

        while let Some(next_ch) = chars.next() {
            match next_ch {
                '}' => {
                    closed = true;
                    break;
                }
                ':' if chars.peek() == Some(&'-') => {
                    chars.next(); // consume '-'
                    let mut value = String::new();
                    for default_ch in chars.by_ref() {
                        if default_ch == '}' {
                            closed = true;
                            break;
                        }
                        value.push(default_ch);
                    }
                    default_value = Some(value);
                    break;
                }
                other => var_name.push(other),
            }
        }

        if !closed {
            return Err(Error::Config(format!(
                "unterminated variable reference '${{{}'",
                var_name
            )));
        }

        match std::env::var(&var_name) {
            Ok(value) => result.push_str(&value),
            Err(_) => result.push_str(default_value.as_deref().unwrap_or("")),
        }
    }

    Ok(result)
}
