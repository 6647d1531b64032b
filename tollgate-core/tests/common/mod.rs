//! Common test utilities shared across test files.
//!
//! This module provides mock implementations and test helpers.
//! Items here may not be used by all test files, hence the module-level allow.
#![allow(dead_code)]

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tollgate_core::approval::{
    ApprovalCallback, ApprovalDecision, ApprovalRequest, ApprovalResult, CallbackReply, ToolArgs,
    ToolPolicy,
};
use tollgate_core::{
    ApprovalConfig, CallContext, GateEvent, GateHook, Tool, ToolError, ToolExecutor, ToolResult,
};

/// Build tool arguments from a `json!` object literal.
pub fn args(value: Value) -> ToolArgs {
    value
        .as_object()
        .cloned()
        .expect("tool arguments must be a JSON object")
}

// ===== Recording Executor =====

/// An executor that records every call it receives and echoes the arguments back.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<(String, ToolArgs)>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every (tool_name, tool_args) pair executed so far
    pub fn calls(&self) -> Vec<(String, ToolArgs)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn execute(
        &self,
        tool_name: &str,
        tool_args: ToolArgs,
        _ctx: &CallContext,
    ) -> Result<ToolResult, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool_name.to_string(), tool_args.clone()));
        Ok(ToolResult::Json(Value::Object(tool_args)))
    }
}

// ===== Scripted Callback =====

/// A callback that returns a fixed decision and counts how often it was asked.
#[derive(Clone)]
pub struct ScriptedCallback {
    decision: ApprovalDecision,
    requests: Arc<Mutex<Vec<ApprovalRequest>>>,
}

impl ScriptedCallback {
    pub fn new(decision: ApprovalDecision) -> Self {
        Self {
            decision,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn approving() -> Self {
        Self::new(ApprovalDecision::approve())
    }

    pub fn approving_for_session() -> Self {
        Self::new(ApprovalDecision::approve_for_session())
    }

    pub fn denying(note: &str) -> Self {
        Self::new(ApprovalDecision::deny_with_note(note))
    }

    /// Number of times the human was asked
    pub fn prompt_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request shown to the human
    pub fn requests(&self) -> Vec<ApprovalRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ApprovalCallback for ScriptedCallback {
    fn request(&self, request: &ApprovalRequest) -> CallbackReply {
        self.requests.lock().unwrap().push(request.clone());
        CallbackReply::Ready(self.decision.clone())
    }
}

/// Like [`ScriptedCallback`] but answers through a pending future.
#[derive(Clone)]
pub struct DeferredCallback {
    decision: ApprovalDecision,
    prompts: Arc<AtomicUsize>,
}

impl DeferredCallback {
    pub fn new(decision: ApprovalDecision) -> Self {
        Self {
            decision,
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl ApprovalCallback for DeferredCallback {
    fn request(&self, _request: &ApprovalRequest) -> CallbackReply {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let decision = self.decision.clone();
        CallbackReply::pending(async move {
            tokio::task::yield_now().await;
            decision
        })
    }
}

// ===== Policies =====

/// Blocks destructive shell commands, defers everything else to config.
pub struct ShellPolicy;

impl ToolPolicy for ShellPolicy {
    fn needs_approval(
        &self,
        tool_name: &str,
        tool_args: &ToolArgs,
        _ctx: &CallContext,
        config: &ApprovalConfig,
    ) -> ApprovalResult {
        let command = tool_args
            .get("command")
            .and_then(|c| c.as_str())
            .unwrap_or_default();
        if tool_name == "shell_exec" && command.starts_with("rm -rf /") {
            return ApprovalResult::blocked("forbidden");
        }
        tollgate_core::approval::needs_approval_from_config(tool_name, config)
    }

    fn description(&self, tool_name: &str, tool_args: &ToolArgs, _ctx: &CallContext) -> Option<String> {
        let command = tool_args.get("command")?.as_str()?;
        (tool_name == "shell_exec").then(|| format!("Run shell command: {}", command))
    }
}

// ===== Test Tools =====

/// Input for the ReadFile test tool
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ReadFileInput {
    pub path: String,
}

/// Pretends to read a file
pub struct ReadFile;

impl Tool for ReadFile {
    type Input = ReadFileInput;

    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a file"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::Text(format!("contents of {}", input.path)))
    }
}

/// A tool that always errors for testing error handling
pub struct ErrorTool;

impl Tool for ErrorTool {
    type Input = ReadFileInput;

    fn name(&self) -> &str {
        "error_tool"
    }

    fn description(&self) -> &str {
        "A tool that errors"
    }

    async fn execute(&self, _input: Self::Input) -> Result<ToolResult, ToolError> {
        Err(ToolError::Custom("Intentional error".to_string()))
    }
}

// ===== Event Collectors for Hook Testing =====

/// Collects event types as strings for simple verification
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl GateHook for EventCollector {
    fn on_event(&self, event: &GateEvent) {
        let event_type = match event {
            GateEvent::ToolRequested { .. } => "tool_requested",
            GateEvent::PolicyBlocked { .. } => "policy_blocked",
            GateEvent::PreApproved { .. } => "pre_approved",
            GateEvent::SessionCacheHit { .. } => "session_cache_hit",
            GateEvent::ApprovalRequested { .. } => "approval_requested",
            GateEvent::ApprovalGranted { .. } => "approval_granted",
            GateEvent::ApprovalDenied { .. } => "approval_denied",
            GateEvent::ApprovalCancelled { .. } => "approval_cancelled",
            GateEvent::ToolCompleted { .. } => "tool_completed",
            GateEvent::ToolFailed { .. } => "tool_failed",
        };
        self.events.lock().unwrap().push(event_type.to_string());
    }
}

/// Collects full GateEvent objects for detailed verification
#[derive(Clone)]
pub struct DetailedEventCollector {
    events: Arc<Mutex<Vec<GateEvent>>>,
}

impl DetailedEventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<GateEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl GateHook for DetailedEventCollector {
    fn on_event(&self, event: &GateEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
