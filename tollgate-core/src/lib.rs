//! # Tollgate
//!
//! Human-in-the-loop approval for tool-calling AI agents.
//!
//! Tollgate wraps the thing that executes an agent's tool calls. Before a call
//! runs, it is classified: blocked outright, pre-approved, or put to a human.
//! A denial comes back to the caller as an ordinary error carrying the human's
//! note, so the agent can adjust its plan within the same run.
//!
//! ## Quick Start
//!
//! ```rust
//! use tollgate_core::approval::{sync_callback, ApprovalDecision, ApprovalRequest};
//! use tollgate_core::{ApprovalConfig, ApprovalGate, CallContext, Tool, ToolBox, ToolError, ToolResult};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct ReadFileInput {
//!     path: String,
//! }
//!
//! struct ReadFile;
//!
//! impl Tool for ReadFile {
//!     type Input = ReadFileInput;
//!
//!     fn name(&self) -> &str { "read_file" }
//!     fn description(&self) -> &str { "Read a file" }
//!
//!     fn execute(&self, input: Self::Input) -> impl std::future::Future<Output = Result<ToolResult, ToolError>> + Send {
//!         async move { Ok(ToolResult::text(format!("contents of {}", input.path))) }
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let gate = ApprovalGate::new(
//!     ToolBox::new().with_tool(ReadFile),
//!     sync_callback(|request: &ApprovalRequest| {
//!         println!("approve {}?", request.description);
//!         ApprovalDecision::deny_with_note("not now")
//!     }),
//! )
//! .with_config(ApprovalConfig::new().pre_approve("read_file"));
//!
//! let args = serde_json::json!({"path": "a.txt"}).as_object().cloned().unwrap();
//! let output = gate.call("read_file", args, &CallContext::new()).await.unwrap();
//! assert_eq!(output.as_text(), "contents of a.txt");
//! # });
//! ```
//!
//! ## How a Call Is Decided
//!
//! 1. A custom [`ToolPolicy`](approval::ToolPolicy), if installed, may block
//!    or pre-approve the call.
//! 2. Otherwise the [`ApprovalConfig`] pre-approves configured tools.
//!    Everything else needs approval.
//! 3. An identical call (same tool, same arguments in any key order) that was
//!    approved for the session runs without asking.
//! 4. Otherwise the [`ApprovalCallback`](approval::ApprovalCallback) is asked.
//!    It may answer right away or hand back a future.
//!
//! ## Errors
//!
//! [`Error::Blocked`] and [`Error::Denied`] are distinct so callers can give
//! up on one and retry the other. See [`Error`].
//!
//! ## Observing Calls
//!
//! Register a [`GateHook`] with [`ApprovalGate::add_hook`] to receive
//! [`GateEvent`]s. Diagnostic records also go through the `log` facade.

pub mod approval;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod gate;
pub mod tool;

pub use config::{load_config_file, ApprovalConfig, ToolConfig};
pub use context::CallContext;
pub use error::{Error, Result};
pub use events::{GateEvent, GateHook, HookId};
pub use gate::{ApprovalGate, Authorized};

// Tools
pub use tool::{
    box_tool, DynTool, Tool, ToolBox, ToolDefinition, ToolError, ToolExecutor, ToolResult,
};
