//! Tools and the executor seam the gate wraps.
//!
//! The gate only needs something that implements [`ToolExecutor`]. For the
//! common case of a fixed set of Rust tools, implement [`Tool`] for each one
//! and collect them in a [`ToolBox`].

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::approval::ToolArgs;
use crate::context::CallContext;

/// Result types that tools can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolResult {
    /// Plain text response
    Text(String),

    /// Structured JSON data - use for complex responses
    Json(Value),
}

impl ToolResult {
    /// Create a JSON result from any serializable type
    pub fn json<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Create a text result from a string
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get the text content if this is a Text variant, or the JSON rendering
    pub fn as_text(&self) -> String {
        match self {
            ToolResult::Text(s) => s.clone(),
            ToolResult::Json(v) => v.to_string(),
        }
    }

    /// Get a reference to the text content if this is a Text variant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToolResult::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Convert strings directly to ToolResult::Text
impl From<String> for ToolResult {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ToolResult {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Custom(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Custom(s.to_string())
    }
}

/// The thing an [`ApprovalGate`](crate::ApprovalGate) wraps.
///
/// Called only once a call has been approved. The gate hands back whatever
/// this returns without looking at it.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run a tool.
    async fn execute(
        &self,
        tool_name: &str,
        tool_args: ToolArgs,
        ctx: &CallContext,
    ) -> Result<ToolResult, ToolError>;
}

#[async_trait]
impl<E: ToolExecutor + ?Sized> ToolExecutor for std::sync::Arc<E> {
    async fn execute(
        &self,
        tool_name: &str,
        tool_args: ToolArgs,
        ctx: &CallContext,
    ) -> Result<ToolResult, ToolError> {
        (**self).execute(tool_name, tool_args, ctx).await
    }
}

/// Trait for implementing typed tools.
///
/// Tools define an input type with `#[derive(Deserialize, JsonSchema)]` to
/// generate JSON schemas from Rust types.
///
/// # Example
///
/// ```rust
/// use tollgate_core::{Tool, ToolResult, ToolError};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct ReadFileInput {
///     /// Path to read
///     path: String,
/// }
///
/// struct ReadFile;
///
/// impl Tool for ReadFile {
///     type Input = ReadFileInput;
///
///     fn name(&self) -> &str { "read_file" }
///     fn description(&self) -> &str { "Read a file" }
///
///     fn execute(&self, input: Self::Input) -> impl std::future::Future<Output = Result<ToolResult, ToolError>> + Send {
///         async move { Ok(format!("contents of {}", input.path).into()) }
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The input type for this tool. Must implement `Deserialize` and `JsonSchema`.
    type Input: DeserializeOwned + JsonSchema;

    /// The name of the tool (e.g., "read_file", "shell_exec")
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// Execute the tool with typed input
    fn execute(&self, input: Self::Input) -> impl Future<Output = Result<ToolResult, ToolError>> + Send;

    /// Get the JSON schema for this tool's input.
    fn input_schema(&self) -> Value {
        let schema = schemars::schema_for!(Self::Input);
        serde_json::to_value(schema).unwrap_or(Value::Null)
    }
}

/// Object-safe version of [`Tool`] for storage in a [`ToolBox`].
///
/// Implement `Tool` instead and use [`box_tool`] to convert.
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    fn execute_raw(
        &self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + '_>>;
}

/// Convert a `Tool` into a type-erased `Box<dyn DynTool>`.
pub fn box_tool<T: Tool + 'static>(tool: T) -> Box<dyn DynTool> {
    Box::new(ToolWrapper(tool))
}

/// Create a `Vec<Box<dyn DynTool>>` from heterogeneous tool types.
///
/// ```ignore
/// let tools = ToolBox::new().with_tools(box_tools![ReadFile, WriteFile, ShellExec]);
/// ```
#[macro_export]
macro_rules! box_tools {
    ($($tool:expr),* $(,)?) => {
        vec![$($crate::tool::box_tool($tool)),*]
    };
}

/// Internal wrapper that implements DynTool for any Tool
struct ToolWrapper<T>(T);

impl<T: Tool + 'static> DynTool for ToolWrapper<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn input_schema(&self) -> Value {
        self.0.input_schema()
    }

    fn execute_raw(
        &self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let typed_input: T::Input = serde_json::from_value(input)
                .map_err(|e| ToolError::InvalidInput(format!("Failed to deserialize input: {}", e)))?;

            self.0.execute(typed_input).await
        })
    }
}

/// Name, description, and input schema of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A name-keyed set of tools that executes calls by name.
///
/// # Example
///
/// ```ignore
/// use tollgate_core::{box_tools, ApprovalGate, ToolBox};
///
/// let tools = ToolBox::new().with_tools(box_tools![ReadFile, DeleteFile]);
/// let gate = ApprovalGate::new(tools, my_callback);
/// ```
#[derive(Default)]
pub struct ToolBox {
    tools: HashMap<String, Box<dyn DynTool>>,
}

impl ToolBox {
    /// Create an empty toolbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn add_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.add_boxed(box_tool(tool));
    }

    /// Add an already boxed tool.
    pub fn add_boxed(&mut self, tool: Box<dyn DynTool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            log::warn!("tool '{}' registered twice; keeping the latest", name);
        }
    }

    /// Builder form of [`ToolBox::add_tool`].
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.add_tool(tool);
        self
    }

    /// Builder form for several boxed tools (see [`box_tools!`]).
    pub fn with_tools(mut self, tools: Vec<Box<dyn DynTool>>) -> Self {
        for tool in tools {
            self.add_boxed(tool);
        }
        self
    }

    /// Check whether a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions of all registered tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

#[async_trait]
impl ToolExecutor for ToolBox {
    async fn execute(
        &self,
        tool_name: &str,
        tool_args: ToolArgs,
        _ctx: &CallContext,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;
        tool.execute_raw(Value::Object(tool_args)).await
    }
}
